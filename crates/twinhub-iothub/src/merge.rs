// SPDX-FileCopyrightText: 2026 Twinhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Combining partial device records.
//!
//! A patch overrides only the fields it sets: non-empty strings and `Some`
//! options. `authentication` and `capabilities` are replaced as a whole, so
//! a patch carrying new symmetric keys never inherits an old thumbprint.

use crate::types::Device;

impl Device {
    /// Applies the fields set in `patch` on top of `self`.
    pub fn merge(&mut self, patch: &Device) {
        override_str(&mut self.device_id, &patch.device_id);
        override_str(&mut self.generation_id, &patch.generation_id);
        override_str(&mut self.etag, &patch.etag);
        override_str(&mut self.connection_state, &patch.connection_state);
        override_opt(&mut self.status, &patch.status);
        override_opt(&mut self.status_reason, &patch.status_reason);
        override_opt(&mut self.authentication, &patch.authentication);
        override_opt(&mut self.capabilities, &patch.capabilities);
    }

    /// Folds `patches` onto `self`, later patches winning.
    pub fn merged_with<'a, I>(mut self, patches: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<&'a Device>>,
    {
        for patch in patches {
            let patch: Option<&Device> = patch.into();
            if let Some(patch) = patch {
                self.merge(patch);
            }
        }
        self
    }
}

/// Folds `patches` onto an empty device. `None` entries are skipped.
pub fn merge_devices<'a, I>(patches: I) -> Device
where
    I: IntoIterator,
    I::Item: Into<Option<&'a Device>>,
{
    Device::default().merged_with(patches)
}

fn override_str(target: &mut String, value: &str) {
    if !value.is_empty() {
        value.clone_into(target);
    }
}

fn override_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

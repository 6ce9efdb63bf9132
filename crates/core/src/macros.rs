// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`display_labels!`] — stable string labels (and `Display`) for status enums
//! - [`setters!`] — builder-style setter methods for config structs

/// Map enum variants to stable string labels.
///
/// Generates a `label()` method returning the literal for each variant
/// (data-carrying variants ignore their fields with `(..)`) plus a
/// `Display` impl that writes it. Labels double as persisted column
/// values, so they must never change once a database has seen them.
///
/// ```ignore
/// crate::display_labels! {
///     Lifecycle {
///         Idle => "idle",
///         Failed(..) => "failed",
///     }
/// }
/// ```
#[macro_export]
macro_rules! display_labels {
    ($ty:ty { $( $variant:ident $(( $($skip:tt)* ))? => $label:expr ),+ $(,)? }) => {
        impl $ty {
            /// Stable label used for logs and persisted columns.
            pub fn label(&self) -> &'static str {
                match self {
                    $( Self::$variant $(( $($skip)* ))? => $label, )+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

/// Builder-style setters, expanded inside an existing `impl` block.
///
/// Three field groups:
/// - `into { name: Ty }` — setter takes `impl Into<Ty>`
/// - `set { name: Ty }` — setter takes the value as-is
/// - `option { name: Ty }` — setter stores `Some(value.into())`
///
/// ```ignore
/// impl EngineConfig {
///     orchard_core::setters! {
///         into { name: String }
///         set { max_ticks: u64 }
///         option { db_path: PathBuf }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (
        $(into { $( $iname:ident : $ity:ty ),* $(,)? })?
        $(set { $( $sname:ident : $sty:ty ),* $(,)? })?
        $(option { $( $oname:ident : $oty:ty ),* $(,)? })?
    ) => {
        $($(
            pub fn $iname(mut self, value: impl Into<$ity>) -> Self {
                self.$iname = value.into();
                self
            }
        )*)?

        $($(
            pub fn $sname(mut self, value: $sty) -> Self {
                self.$sname = value;
                self
            }
        )*)?

        $($(
            pub fn $oname(mut self, value: impl Into<$oty>) -> Self {
                self.$oname = Some(value.into());
                self
            }
        )*)?
    };
}

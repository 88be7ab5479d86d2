// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A macro declaring usage flag sets for GPU resources.

/// Declares a copyable flag set backed by an unsigned integer.
///
/// The generated type supports `|`, `&`, `contains`, `intersects` and a
/// `Debug` output listing the named flags that are set.
#[macro_export]
#[doc(hidden)]
macro_rules! tessel_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// The set with no flag.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Builds a set from raw bits, keeping unknown bits as they are.
            pub const fn from_bits_retain(bits: $ty) -> Self {
                Self { bits }
            }

            /// The raw bits of the set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// `true` when every flag of `other` is set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// `true` when `self` and `other` share at least one flag.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// `true` when no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut remaining = self.bits;
                let mut names: Vec<&'static str> = Vec::new();
                $(
                    if $flag_value != 0 && (remaining & $flag_value) == $flag_value {
                        names.push(stringify!($flag_name));
                        remaining &= !$flag_value;
                    }
                )*

                write!(f, "{}(", stringify!($name))?;
                if names.is_empty() && remaining == 0 {
                    write!(f, "EMPTY")?;
                } else {
                    write!(f, "{}", names.join(" | "))?;
                    if remaining != 0 {
                        if !names.is_empty() {
                            write!(f, " | ")?;
                        }
                        write!(f, "{:#x}", remaining)?;
                    }
                }
                write!(f, ")")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    tessel_bitflags! {
        /// Flags used to exercise the macro.
        pub struct Access: u32 {
            const READ = 1 << 0;
            const WRITE = 1 << 1;
            const COPY = 1 << 2;
        }
    }

    #[test]
    fn empty_set_contains_nothing() {
        let access = Access::default();
        assert!(access.is_empty());
        assert!(!access.contains(Access::READ));
        assert!(access.contains(Access::EMPTY));
        assert_eq!(format!("{access:?}"), "Access(EMPTY)");
    }

    #[test]
    fn union_and_intersection() {
        let mut access = Access::READ | Access::COPY;
        assert!(access.contains(Access::READ));
        assert!(!access.contains(Access::READ | Access::WRITE));
        assert!(access.intersects(Access::READ | Access::WRITE));

        access |= Access::WRITE;
        assert_eq!(access.bits(), 0b111);
        assert_eq!(access & Access::WRITE, Access::WRITE);
    }

    #[test]
    fn debug_lists_named_and_unknown_bits() {
        let access = Access::WRITE | Access::from_bits_retain(1 << 8);
        assert_eq!(format!("{access:?}"), "Access(WRITE | 0x100)");
        assert_eq!(
            format!("{:?}", Access::READ | Access::COPY),
            "Access(READ | COPY)"
        );
    }
}

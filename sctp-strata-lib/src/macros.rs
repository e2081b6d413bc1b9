// Generates a newtype around a wire integer together with its named constants,
// a hidden name enum for string conversions, and the Display/serde plumbing.
#[macro_export]
macro_rules! protocol_constants {
    // 1. Constructor Helper: Identity (for u8)
    (@construct_u8 $ztype:ty, $val:expr) => { $val };

    // 2. Constructor Helper: New (for U16 etc)
    (@construct_new $ztype:ty, $val:expr) => { <$ztype>::new($val) };

    // 3. Body Implementation
    (@impl $(#[$outer:meta])*, $type_name:ident, $ztype:ty, $primitive:ty, $strategy:ident, $( $(#[$default:ident])? $const_name:ident = $val:expr; )+ ) => {
        paste::paste! {
            #[doc = concat!("A newtype wrapper around a ", stringify!($primitive), " carrying an SCTP ", stringify!($type_name), " code.")]
            ///
            /// Named constants cover the codes defined by RFC 4960 and its extensions;
            /// `Display` prints the kebab-case name, or the hex value for unknown codes.
            $(#[$outer])*
            #[repr(transparent)]
            #[derive(
                Clone,
                Copy,
                PartialEq,
                Eq,
                Hash,
                Debug,
                FromBytes,
                IntoBytes,
                Immutable,
                KnownLayout,
                Unaligned,
            )]
            pub struct $type_name(pub $ztype);

            impl $type_name {
                $(
                    pub const $const_name: $type_name = $type_name($crate::protocol_constants!(@$strategy $ztype, $val));
                )+

                /// Kebab-case name of the code, `None` for codes outside this table
                pub fn name(&self) -> Option<&'static str> {
                    let p: $primitive = self.0.into();
                    [< $type_name Name >]::try_from(p).ok().map(<&'static str>::from)
                }

                /// Returns true if the code has a name in this table
                pub fn is_known(&self) -> bool {
                    self.name().is_some()
                }
            }

            impl Default for $type_name {
                fn default() -> Self {
                    $( $(if stringify!($default) == "default" {
                            return Self::$const_name;
                        })?
                    )+
                    Self($crate::protocol_constants!(@$strategy $ztype, 0))
                }
            }

            #[derive(Debug, PartialEq, strum::EnumString, strum::IntoStaticStr, Clone, Copy)]
            #[strum(serialize_all = "kebab-case")]
            #[allow(non_camel_case_types)]
            enum [< $type_name Name >] {
                $(
                    $const_name,
                )+
            }

            impl From<[< $type_name Name >]> for $primitive {
                fn from(v: [< $type_name Name >]) -> Self {
                    match v {
                        $(
                            [< $type_name Name >]::$const_name => $val,
                        )+
                    }
                }
            }

            impl TryFrom<$primitive> for [< $type_name Name >] {
                type Error = ();
                fn try_from(v: $primitive) -> Result<Self, Self::Error> {
                    match v {
                        $(
                            $val => Ok([< $type_name Name >]::$const_name),
                        )+
                        _ => Err(()),
                    }
                }
            }

            impl From<$primitive> for $type_name {
                fn from(v: $primitive) -> Self {
                    Self(v.into())
                }
            }

            impl From<$type_name> for $primitive {
                fn from(v: $type_name) -> Self {
                    v.0.into()
                }
            }

            impl std::str::FromStr for $type_name {
                type Err = ();

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let variant = <[< $type_name Name >] as std::str::FromStr>::from_str(s).map_err(|_| ())?;
                    let p: $primitive = variant.into();
                    Ok(Self::from(p))
                }
            }

            impl std::fmt::Display for $type_name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    match self.name() {
                        Some(name) => f.write_str(name),
                        None => write!(f, "0x{:x}", <$primitive>::from(*self)),
                    }
                }
            }

            // With `protocol_names`, known codes travel as their name and the rest
            // as "0x.." through Display; FromStr and hex are accepted back.
            #[cfg(feature = "protocol_names")]
            impl serde::Serialize for $type_name {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serializer.collect_str(self)
                }
            }

            #[cfg(feature = "protocol_names")]
            impl<'de> serde::Deserialize<'de> for $type_name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                    if let Ok(code) = s.parse::<$type_name>() {
                        return Ok(code);
                    }
                    s.strip_prefix("0x")
                        .and_then(|hex| <$primitive>::from_str_radix(hex, 16).ok())
                        .map($type_name::from)
                        .ok_or_else(|| {
                            serde::de::Error::custom(format!("unknown {}: {}", stringify!($type_name), s))
                        })
                }
            }

            #[cfg(not(feature = "protocol_names"))]
            impl serde::Serialize for $type_name {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    let val: $primitive = self.0.into();
                    serde::Serialize::serialize(&val, serializer)
                }
            }

            #[cfg(not(feature = "protocol_names"))]
            impl<'de> serde::Deserialize<'de> for $type_name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    let val = <$primitive as serde::Deserialize>::deserialize(deserializer)?;
                    Ok($type_name::from(val))
                }
            }
        }
    };

    // 4. Entry Point: u8 specialization
    (   $(#[$outer:meta])*
        $type_name:ident,
        u8,
        $primitive:ty:
        $( $(#[$default:ident])? $const_name:ident = $val:expr; )+
    ) => {
        $crate::protocol_constants!(@impl $(#[$outer])*, $type_name, u8, $primitive, construct_u8, $( $(#[$default])? $const_name = $val; )+ );
    };

    // 5. Entry Point: Generic (U16, etc)
    (   $(#[$outer:meta])*
        $type_name:ident,
        $ztype:ty,
        $primitive:ty:
        $( $(#[$default:ident])? $const_name:ident = $val:expr; )+
    ) => {
        $crate::protocol_constants!(@impl $(#[$outer])*, $type_name, $ztype, $primitive, construct_new, $( $(#[$default])? $const_name = $val; )+ );
    };
}

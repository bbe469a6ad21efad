//! Internal macros shared by the typed structures.

/// Declare the input enum accepted by `from_any` for a typed structure and
/// implement `from_any` on it.
///
/// `typed_input!(EncryptedDataInput => EncryptedData)` expands to an enum
/// with `Typed(&EncryptedData)` and `Tree(&Node)` variants, `From` impls
/// for both, and `EncryptedData::from_any`, which clones the typed value or
/// parses the tree with `from_node`.
macro_rules! typed_input {
    ($(#[$meta:meta])* $input:ident => $ty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub enum $input<'a> {
            Typed(&'a $ty),
            Tree(&'a berder_asn1::asn1::Node),
        }

        impl<'a> From<&'a $ty> for $input<'a> {
            fn from(value: &'a $ty) -> Self {
                $input::Typed(value)
            }
        }

        impl<'a> From<&'a berder_asn1::asn1::Node> for $input<'a> {
            fn from(node: &'a berder_asn1::asn1::Node) -> Self {
                $input::Tree(node)
            }
        }

        impl $ty {
            /// Accept either an already typed value or a raw value tree.
            pub fn from_any<'a>(
                input: impl Into<$input<'a>>,
            ) -> Result<Self, berder_types::PkiError> {
                match input.into() {
                    $input::Typed(value) => Ok(value.clone()),
                    $input::Tree(node) => Self::from_node(node),
                }
            }
        }
    };
}

/// Implement `PartialEq`, `Eq` and `Hash` over the value's DER encoding,
/// so a BER-parsed value equals the same value built directly.
///
/// The type needs `to_der(&self) -> Result<Vec<u8>, PkiError>` and
/// `to_node(&self) -> Node`; the tree is compared only when encoding fails.
macro_rules! der_equality {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    match (self.to_der(), other.to_der()) {
                        (Ok(a), Ok(b)) => a == b,
                        _ => self.to_node() == other.to_node(),
                    }
                }
            }

            impl Eq for $ty {}

            impl std::hash::Hash for $ty {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    match self.to_der() {
                        Ok(der) => std::hash::Hash::hash(&der, state),
                        Err(_) => std::hash::Hash::hash(&self.to_node(), state),
                    }
                }
            }
        )+
    };
}

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod inner;

/// Implements `libwifi::Addresses` for management frame structs that carry their
/// MAC header in a field called `header`.
///
/// Only meant for use inside the libwifi crate, since the generated impl refers to
/// `crate::` paths.
///
/// ```rust,ignore
/// #[derive(Clone, Debug, AddressHeader)]
/// pub struct Deauthentication {
///     pub header: MacHeader,
///     pub reason_code: u16,
/// }
/// ```
///
/// expands to
///
/// ```rust,ignore
/// impl crate::Addresses for Deauthentication {
///     fn src(&self) -> Option<&crate::frame::components::MacAddress> {
///         crate::Addresses::src(&self.header)
///     }
///     // dest() and bssid() forward the same way
/// }
/// ```
#[proc_macro_derive(AddressHeader)]
pub fn address_header(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let toks = inner::address_header_inner(&input).unwrap_or_else(|err| err.to_compile_error());

    toks.into()
}

use proc_macro::TokenStream;
use quote::quote;
use syn::{Ident, ItemFn, LitStr, parse_macro_input, spanned::Spanned};

/// Marks a synchronous test and installs a `tracing` subscriber that writes
/// through the test harness' captured output.
///
/// Without arguments the filter comes from `RUST_LOG`. A level may be given
/// as an identifier or a string: `#[rxmarble_macro::test(debug)]`.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);

  if input.sig.asyncness.is_some() {
    return TokenStream::from(
      syn::Error::new(
        input.sig.fn_token.span(),
        "rxmarble_macro::test only supports synchronous tests: virtual time needs no runtime",
      )
      .to_compile_error(),
    );
  }

  let raw_args = proc_macro2::TokenStream::from(attr);
  let level = if raw_args.is_empty() {
    None
  } else if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
    match level_tokens(&ident.to_string()) {
      Some(level) => Some(level),
      None => return unknown_level(ident.span()),
    }
  } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
    match level_tokens(&lit.value()) {
      Some(level) => Some(level),
      None => return unknown_level(lit.span()),
    }
  } else {
    return unknown_level(raw_args.span());
  };

  let init = match level {
    Some(level) => quote! {
      let _ = ::tracing_subscriber::fmt()
        .with_max_level(#level)
        .with_test_writer()
        .try_init();
    },
    None => quote! {
      let _ = ::tracing_subscriber::fmt()
        .with_env_filter(::tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    },
  };

  let ItemFn { attrs, vis, sig, block } = input;
  let expanded = quote! {
      #[test]
      #(#attrs)*
      #vis #sig {
        #init
        #block
      }
  };

  TokenStream::from(expanded)
}

fn level_tokens(name: &str) -> Option<proc_macro2::TokenStream> {
  let level = match name {
    "trace" => quote!(::tracing::Level::TRACE),
    "debug" => quote!(::tracing::Level::DEBUG),
    "info" => quote!(::tracing::Level::INFO),
    "warn" => quote!(::tracing::Level::WARN),
    "error" => quote!(::tracing::Level::ERROR),
    _ => return None,
  };
  Some(level)
}

fn unknown_level(span: proc_macro2::Span) -> TokenStream {
  TokenStream::from(
    syn::Error::new(
      span,
      "rxmarble_macro::test only accepts a log level: trace, debug, info, warn or error",
    )
    .to_compile_error(),
  )
}

//! Attribute macros that drive `async fn` entry points and tests through
//! `core_async::runtime` instead of a direct Tokio dependency.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Ident, ItemFn};

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Test)
}

#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Main)
}

enum MacroKind {
    Test,
    Main,
}

/// Which runtime the generated wrapper drives the body on.
enum Flavor {
    CurrentThread,
    MultiThread,
}

fn parse_flavor(attr: TokenStream) -> syn::Result<Flavor> {
    if attr.is_empty() {
        return Ok(Flavor::CurrentThread);
    }

    let tokens = TokenStream2::from(attr);
    let ident: Ident = syn::parse2(tokens.clone())
        .map_err(|_| syn::Error::new_spanned(&tokens, "expected `current_thread` or `multi_thread`"))?;

    match ident.to_string().as_str() {
        "current_thread" => Ok(Flavor::CurrentThread),
        "multi_thread" => Ok(Flavor::MultiThread),
        other => Err(syn::Error::new_spanned(
            ident,
            format!("unknown runtime flavor `{other}`"),
        )),
    }
}

fn expand(attr: TokenStream, item: TokenStream, kind: MacroKind) -> TokenStream {
    let flavor = match parse_flavor(attr) {
        Ok(flavor) => flavor,
        Err(err) => return err.to_compile_error().into(),
    };

    let input = parse_macro_input!(item as ItemFn);

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            input.sig.fn_token,
            "core_async attribute macros require `async fn`",
        )
        .to_compile_error()
        .into();
    }

    let mut sig = input.sig;
    sig.asyncness = None;

    let attrs = input.attrs;
    let vis = input.vis;
    let body = input.block;

    let runner = match flavor {
        Flavor::CurrentThread => quote!(core_async::runtime::block_on),
        Flavor::MultiThread => quote!(core_async::runtime::block_on_multi_thread),
    };

    let test_attr = match kind {
        MacroKind::Test => quote!(#[test]),
        MacroKind::Main => TokenStream2::new(),
    };

    quote! {
        #(#attrs)*
        #test_attr
        #vis #sig {
            #runner(async move #body)
        }
    }
    .into()
}

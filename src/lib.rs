/*
 *  Canny - Discord bot relaying a competition's submission windows and leaderboards.
 *  Copyright (C) 2025  The Canny contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
/*
 * The package is a proc-macro library so the binary can use `#[canny::log_cmd]` on its poise
 * commands (procedural macros must be defined in a crate of their own).
 */
extern crate proc_macro;
use proc_macro::TokenStream;
use quote::ToTokens as _; // To use function.into_token_stream().
use syn::spanned::Spanned;
use syn::{parse_macro_input, ItemFn};

/// Builds a compile error pointing at `item`, prefixed with the macro name.
fn macro_error<T: Spanned>(item: &T, msg: &str) -> TokenStream {
    darling::Error::from(syn::Error::new(item.span(), format!("[log_cmd] {}", msg)))
        .write_errors()
        .into()
}

/**
 * Logs every invocation of a poise command through `tracing`.
 *
 * The command's first argument must be its `poise::Context`, bound to a plain identifier. The
 * macro prepends `crate::utils::log_cmd!(<ctx>);` to the body, so the expansion site must provide
 * that macro.
 *
 * Only `async fn` items are accepted.
 */
#[proc_macro_attribute]
pub fn log_cmd(_macro_attrs: TokenStream, function: TokenStream) -> TokenStream {
    let mut function = parse_macro_input!(function as ItemFn);

    if function.sig.asyncness.is_none() {
        return macro_error(&function.sig, "commands must be `async fn`");
    }

    let Some(first_arg) = function.sig.inputs.first() else {
        return macro_error(
            &function.sig,
            "function must take the command context as its first argument",
        );
    };
    let syn::FnArg::Typed(ctx_arg) = first_arg else {
        return macro_error(first_arg, "`self` argument is not allowed");
    };
    let syn::Pat::Ident(ident) = &*ctx_arg.pat else {
        return macro_error(&ctx_arg.pat, "expected an identifier for the context");
    };
    let ctx_ident = ident.ident.clone();

    let log_stmt: syn::Stmt = syn::parse_quote! {
        crate::utils::log_cmd!(#ctx_ident);
    };
    function.block.stmts.insert(0, log_stmt);

    function.into_token_stream().into()
}

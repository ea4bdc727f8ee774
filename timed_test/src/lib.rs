/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use proc_macro::TokenStream;
use quote::quote;
use syn::Expr;
use syn::ItemFn;
use syn::Lit;
use syn::MetaNameValue;
use syn::Token;
use syn::parse_macro_input;
use syn::punctuated::Punctuated;

/// The runtime a timed test is driven on.
enum Flavor {
    CurrentThread,
    MultiThread,
}

struct Args {
    timeout_secs: u64,
    flavor: Flavor,
}

fn parse_args(args: Punctuated<MetaNameValue, Token![,]>) -> syn::Result<Args> {
    let mut timeout_secs = None;
    let mut flavor = Flavor::MultiThread;

    for arg in args {
        let Expr::Lit(lit) = &arg.value else {
            return Err(syn::Error::new_spanned(
                &arg.value,
                "unexpected argument value, please pass a literal",
            ));
        };
        if arg.path.is_ident("timeout_secs") {
            let Lit::Int(val) = &lit.lit else {
                return Err(syn::Error::new_spanned(
                    &arg.value,
                    "unexpected value for timeout_secs, please pass an integer literal",
                ));
            };
            timeout_secs = Some(val.base10_parse::<u64>()?);
        } else if arg.path.is_ident("flavor") {
            flavor = match &lit.lit {
                Lit::Str(val) if val.value() == "current_thread" => Flavor::CurrentThread,
                Lit::Str(val) if val.value() == "multi_thread" => Flavor::MultiThread,
                _ => {
                    return Err(syn::Error::new_spanned(
                        &arg.value,
                        "unexpected value for flavor, please pass \"current_thread\" or \"multi_thread\"",
                    ));
                }
            };
        } else {
            return Err(syn::Error::new_spanned(
                &arg.path,
                "only timeout_secs and flavor allowed as arguments",
            ));
        }
    }

    match timeout_secs {
        Some(timeout_secs) => Ok(Args {
            timeout_secs,
            flavor,
        }),
        None => Err(syn::Error::new(
            proc_macro::Span::call_site().into(),
            "timeout_secs is required",
        )),
    }
}

/// A test macro that wraps tokio::test and adds a configurable timeout.
///
/// The test body runs on a multi-threaded runtime unless
/// `flavor = "current_thread"` is given.
///
/// # Examples
///
/// ```rust
/// #[async_timed_test(timeout_secs = 5)]
/// async fn my_test() {
///     // Test that should complete within 5 seconds
///     tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;
/// }
///
/// #[async_timed_test(timeout_secs = 5, flavor = "current_thread")]
/// async fn my_single_threaded_test() {
///     tokio::task::yield_now().await;
/// }
/// ```
#[proc_macro_attribute]
pub fn async_timed_test(attr: TokenStream, input: TokenStream) -> TokenStream {
    let args =
        parse_macro_input!(attr with Punctuated::<MetaNameValue, Token![,]>::parse_terminated);
    let input_fn = parse_macro_input!(input as ItemFn);

    let Args {
        timeout_secs,
        flavor,
    } = match parse_args(args) {
        Ok(args) => args,
        Err(err) => return TokenStream::from(err.to_compile_error()),
    };

    let fn_block = &input_fn.block;
    let fn_attrs = &input_fn.attrs;
    let fn_vis = &input_fn.vis;
    let sig = &input_fn.sig;
    let fn_name = &sig.ident;
    let output = &sig.output;

    if sig.asyncness.is_none() {
        return TokenStream::from(
            syn::Error::new_spanned(sig, "test function must be async").to_compile_error(),
        );
    }

    let builder = match flavor {
        Flavor::CurrentThread => quote! { tokio::runtime::Builder::new_current_thread() },
        Flavor::MultiThread => quote! {
            {
                let mut builder = tokio::runtime::Builder::new_multi_thread();
                builder.worker_threads(8);
                builder
            }
        },
    };

    let output = quote! {
        #[test]
        #(#fn_attrs)*
        #fn_vis fn #fn_name() #output {
            use std::sync::mpsc::{channel, RecvTimeoutError};
            use std::thread;
            use std::time::Duration;

            let (result_tx, result_rx) = channel();

            // Create a separate thread to drive the test runtime. This is to
            // ensure that even if the runtime gets stuck somehow, we will still
            // be able to enforce the timeout.
            thread::spawn(move || {
                let test_rt = #builder
                    .enable_all()
                    .build()
                    .unwrap();
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    test_rt.block_on(async #fn_block)
                }));
                let _ = result_tx.send(result);
            });

            // Wait with timeout - guaranteed to fire independently of test runtime
            match result_rx.recv_timeout(Duration::from_secs(#timeout_secs)) {
                Ok(result) => match result {
                    Ok(test_result) => test_result,
                    Err(panic) => std::panic::resume_unwind(panic),
                },
                Err(RecvTimeoutError::Timeout) => {
                    panic!("test timed out after {} seconds", #timeout_secs);
                },
                Err(RecvTimeoutError::Disconnected) => {
                    panic!("test thread panicked without sending result");
                }
            }
        }
    };

    output.into()
}

use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Times a system or function when the `perf_stats` feature is enabled.
///
/// The body is wrapped in a drop guard that reports elapsed time through
/// `bevy::log::info!` when it exceeds the threshold (milliseconds, default 1).
/// If the function takes a `Res<SimTick>` argument the guard also reports on
/// every 100th tick, tagged with the tick number.
///
/// ```ignore
/// #[profile(2)]
/// pub fn process_path_requests(tick: Res<SimTick>, /* ... */) { /* ... */ }
/// ```
///
/// Without `perf_stats` the guard is compiled out and the function is unchanged.
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = attr.to_string().trim().parse().unwrap_or(1);

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let label = sig.ident.to_string();

    let tick_ident = sig.inputs.iter().find_map(|arg| {
        let FnArg::Typed(pat_type) = arg else { return None };
        let Pat::Ident(pat_ident) = &*pat_type.pat else { return None };
        let ty = pat_type.ty.to_token_stream().to_string();
        ty.contains("SimTick").then(|| pat_ident.ident.clone())
    });

    let (tick_field, tick_init, tick_check) = match &tick_ident {
        Some(ident) => (
            quote! { tick: u64, },
            quote! { tick: #ident.0, },
            quote! { || self.tick % 100 == 0 },
        ),
        None => (quote! {}, quote! {}, quote! {}),
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = {
                struct ProfileGuard {
                    label: &'static str,
                    started: std::time::Instant,
                    #tick_field
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.started.elapsed();
                        if elapsed.as_millis() > #threshold_ms #tick_check {
                            bevy::log::info!("[PERF] {}: {:?}", self.label, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    label: #label,
                    started: std::time::Instant::now(),
                    #tick_init
                }
            };

            #block
        }
    };

    output.into()
}

//! Daily Tasks Front-End
//!
//! Browser version of the entry form built with Leptos (WASM).
//!
//! # Architecture
//!
//! Client-side rendered (CSR) Leptos application. Rows are fetched from the
//! hosted row API over HTTP; changes arrive over the backend's WebSocket
//! change feed. Validation and the list reducer come from the `daily-tasks`
//! crate so both front-ends behave the same.

use leptos::*;

mod api;
mod app;
mod components;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}

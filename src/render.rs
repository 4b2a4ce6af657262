// ABOUTME: Plain-text rendering of easyads pages for the terminal.
// ABOUTME: Each page becomes a String so output stays testable and stdout-only.

use std::fmt::Write;

use easyads_client::views::{CreateProductForm, Dashboard, Load, ProductPage};
use easyads_client::Page;
use easyads_core::{Generation, SessionState};

pub fn page(page: &Page) -> String {
    match page {
        Page::Landing => landing(),
        Page::Dashboard(dashboard) => dashboard_page(dashboard),
        Page::CreateProduct(form) => create_page(form),
        Page::Product(product) => product_page(product),
        Page::Redirect(to) => format!("Not signed in. Redirected to {}.\n{}", to, landing()),
    }
}

pub fn session(state: &SessionState) -> String {
    match state {
        SessionState::Loading => "Session: resolving".to_string(),
        SessionState::Authenticated(session) => format!(
            "Session: signed in since {}",
            session.established_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        SessionState::Unauthenticated => "Session: signed out".to_string(),
    }
}

fn landing() -> String {
    "easyads: turn one product photo into marketing images and videos.\n\
     Run `easyads login` or `easyads signup` to get started.\n"
        .to_string()
}

fn dashboard_page(dashboard: &Dashboard) -> String {
    let mut out = String::from("Your Products\n\n");
    match dashboard.products() {
        Load::Loading => out.push_str("Loading...\n"),
        Load::Failed(message) => {
            let _ = writeln!(out, "Error: {}", message);
        }
        Load::Ready(products) if products.is_empty() => {
            out.push_str("No products yet. Create your first ad with `easyads create`.\n");
        }
        Load::Ready(products) => {
            for product in products {
                let _ = writeln!(out, "[{}] {}", product.id, product.name);
                let _ = writeln!(out, "    {}", product.description);
                let _ = writeln!(out, "    {}", product.image_url);
            }
        }
    }
    if let Some(message) = dashboard.error() {
        let _ = writeln!(out, "\nError: {}", message);
    }
    out
}

fn create_page(form: &CreateProductForm) -> String {
    let mut out = String::from("Upload New Product\n\n");
    match form.error() {
        Some(message) => {
            let _ = writeln!(out, "Error: {}", message);
        }
        None => out.push_str(
            "Use `easyads create --name <NAME> --description <TEXT> --file <IMAGE>`.\n",
        ),
    }
    out
}

fn product_page(page: &ProductPage) -> String {
    let mut out = String::new();
    match page.detail() {
        Load::Loading => out.push_str("Loading...\n"),
        Load::Failed(message) => {
            let _ = writeln!(out, "Error: {}", message);
        }
        Load::Ready(detail) => {
            let _ = writeln!(out, "{}", detail.product.name);
            let _ = writeln!(out, "{}", detail.product.description);
            let _ = writeln!(out, "{}\n", detail.product.image_url);
            out.push_str("Generated Assets\n\n");
            if detail.generations.is_empty() {
                out.push_str("No generations yet. Try `easyads generate`.\n");
            }
            for generation in &detail.generations {
                generation_entry(&mut out, generation);
            }
        }
    }
    if let Some(message) = page.error() {
        let _ = writeln!(out, "\nError: {}", message);
    }
    out
}

fn generation_entry(out: &mut String, generation: &Generation) {
    let _ = writeln!(
        out,
        "#{} \"{}\" ({})",
        generation.id, generation.prompt, generation.status
    );
    if let Some(url) = &generation.result_image_url {
        let _ = writeln!(out, "    image: {}", url);
    }
    if let Some(url) = &generation.result_video_url {
        let _ = writeln!(out, "    video: {}", url);
    }
}

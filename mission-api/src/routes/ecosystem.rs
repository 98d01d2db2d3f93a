//! Ecosystem Routes
//!
//! The product catalog in `memory/ecosystem/products.json` and the
//! per-product memory directories under `memory/<slug>/`.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use mission_core::{fallback, ops::decode_records, EcosystemProduct};
use mission_storage::Workspace;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{
    state::AppState,
    telemetry::metrics::fallback_served,
    types::{EcosystemListResponse, ProductDetailResponse},
};

const SECTIONS: [&str; 7] = [
    "overview",
    "brand",
    "community",
    "content",
    "legal",
    "product",
    "website",
];

/// Reserved slug that lists the catalog.
const LIST_SLUG: &str = "_list";

/// Slugs become directory names under `memory/`.
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

async fn catalog(workspace: &Workspace) -> Option<Vec<EcosystemProduct>> {
    let doc: Value = workspace
        .read_json(
            workspace.path(["memory", "ecosystem", "products.json"]),
            Value::Null,
        )
        .await;
    doc.get("products")
        .and_then(Value::as_array)
        .map(|items| decode_records(items))
}

/// GET /api/ecosystem - Product catalog
#[utoipa::path(
    get,
    path = "/api/ecosystem",
    tag = "Ecosystem",
    responses(
        (status = 200, description = "Every tracked product", body = EcosystemListResponse),
    ),
)]
pub async fn list_products(State(workspace): State<Workspace>) -> Json<EcosystemListResponse> {
    let products = catalog(&workspace).await.unwrap_or_else(|| {
        fallback_served("ecosystem");
        fallback::products()
    });
    Json(EcosystemListResponse { products })
}

/// GET /api/ecosystem/:slug - One product and its memory sections
///
/// `_list` is answered with the catalog instead.
#[utoipa::path(
    get,
    path = "/api/ecosystem/{slug}",
    tag = "Ecosystem",
    params(
        ("slug" = String, Path, description = "Product slug, or `_list` for the catalog"),
    ),
    responses(
        (status = 200, description = "Product detail", body = ProductDetailResponse),
    ),
)]
pub async fn get_product(
    State(workspace): State<Workspace>,
    Path(slug): Path<String>,
) -> Response {
    if slug == LIST_SLUG {
        return list_products(State(workspace)).await.into_response();
    }
    product_detail(&workspace, &slug).await.into_response()
}

async fn product_detail(workspace: &Workspace, slug: &str) -> Json<ProductDetailResponse> {
    let known = match catalog(workspace).await {
        Some(products) => products,
        None => fallback::products(),
    };
    let product = known
        .into_iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| EcosystemProduct::unknown(slug));

    let mut sections = BTreeMap::new();
    let mut files = Vec::new();
    if is_safe_slug(slug) {
        let dir = workspace.path(["memory", slug]);
        for section in SECTIONS {
            let text = workspace.read_text(dir.join(format!("{}.md", section))).await;
            if !text.is_empty() {
                sections.insert(section.to_string(), text);
            }
        }
        files = workspace.list_dir(&dir).await;
    } else {
        tracing::debug!(slug = %slug, "Refusing to read memory for unsafe slug");
    }

    Json(ProductDetailResponse {
        product,
        sections,
        files,
    })
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/:slug", get(get_product))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_slug() {
        assert!(is_safe_slug("nebula-os"));
        assert!(is_safe_slug("v1.2_beta"));
        assert!(!is_safe_slug(""));
        assert!(!is_safe_slug(".."));
        assert!(!is_safe_slug("../etc"));
        assert!(!is_safe_slug("a/b"));
        assert!(!is_safe_slug("a b"));
    }
}

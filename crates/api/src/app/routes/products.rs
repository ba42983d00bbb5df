use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    response::Response,
    routing::get,
    Json, Router,
};

use stockroom_core::Entity;
use stockroom_products::Product;

use crate::app::dto::ProductRequest;
use crate::app::errors::ApiResult;
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_products).post(create_product).put(update_product),
        )
        .route("/:id", get(get_product).delete(delete_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    let product = body.into_new()?;
    product.validate()?;

    let mut session = services.session().await?;
    let created = session.products().create(product).await?;
    session.commit().await?;

    tracing::debug!(id = ?created.id, "product created");
    common::created(created)
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    let product = body.into_existing()?;
    product.validate()?;

    let mut session = services.session().await?;
    let updated = session.products().edit(product).await?;
    session.commit().await?;

    tracing::debug!(id = ?updated.id, "product updated");
    common::updated(updated)
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<Product>>> {
    common::list::<Product>(&services, &params).await
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    common::get_one::<Product>(&services, &id).await
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    common::delete::<Product>(&services, &id).await
}

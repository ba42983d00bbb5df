use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use stockroom_core::{Entity, FieldValue, Repository, SerialId};
use stockroom_infra::Session;
use stockroom_inventory::Inventory;
use stockroom_products::Product;

use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::API_BASE;
use crate::app::services::AppServices;

/// Human-readable outcome of a write, e.g. "A product is updated with identifier 1".
pub static ALERT_HEADER: HeaderName = HeaderName::from_static("x-stockroom-alert");

/// Identifier the alert refers to.
pub static PARAMS_HEADER: HeaderName = HeaderName::from_static("x-stockroom-params");

/// An entity exposed over HTTP, with the route it lives under.
pub trait Resource: Entity + Serialize {
    /// Path below [`API_BASE`], without trailing slash.
    const PATH: &'static str;

    fn repository(session: &mut dyn Session) -> Box<dyn Repository<Self, Self::Id> + '_>;
}

impl Resource for Product {
    const PATH: &'static str = "/api/product";

    fn repository(session: &mut dyn Session) -> Box<dyn Repository<Self, Self::Id> + '_> {
        session.products()
    }
}

impl Resource for Inventory {
    const PATH: &'static str = "/api/inventory";

    fn repository(session: &mut dyn Session) -> Box<dyn Repository<Self, Self::Id> + '_> {
        session.inventories()
    }
}

pub fn parse_id<R: Resource>(raw: &str) -> ApiResult<R::Id> {
    Ok(raw.parse::<R::Id>()?)
}

/// Turn the query string into at most one `(field, value)` lookup.
///
/// Pairs are taken as sent, so a repeated key counts as two lookups.
pub fn lookup_param<R: Resource>(
    params: &[(String, String)],
) -> ApiResult<Option<(&'static str, FieldValue)>> {
    let mut iter = params.iter();
    let Some((name, raw)) = iter.next() else {
        return Ok(None);
    };
    if iter.next().is_some() {
        return Err(ApiError::validation("at most one lookup parameter is supported"));
    }

    let field = R::lookup(name).ok_or_else(|| {
        ApiError::validation(format!("{} has no lookup field `{name}`", R::NAME))
    })?;
    Ok(Some((field.name, field.parse(raw)?)))
}

pub async fn get_one<R: Resource>(services: &AppServices, raw_id: &str) -> ApiResult<Json<R>> {
    let id = parse_id::<R>(raw_id)?;
    let mut session = services.session().await?;
    let found = R::repository(session.as_mut()).find(&id).await?;
    session.commit().await?;

    found
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} not found: {id}", R::NAME)))
}

/// List every row, or the rows matching a single lookup parameter.
///
/// The deadline covers opening the session as well as the query.
pub async fn list<R: Resource>(
    services: &AppServices,
    params: &[(String, String)],
) -> ApiResult<Json<Vec<R>>> {
    let lookup = lookup_param::<R>(params)?;

    services
        .with_list_timeout(async {
            let mut session = services.session().await?;
            let rows = {
                let mut repo = R::repository(session.as_mut());
                match &lookup {
                    Some((field, value)) => repo.find_by(field, value).await?,
                    None => repo.find_all().await?,
                }
            };
            session.commit().await?;
            tracing::debug!(entity = R::NAME, count = rows.len(), "listed");
            Ok(Json(rows))
        })
        .await
}

pub async fn delete<R: Resource>(services: &AppServices, raw_id: &str) -> ApiResult<Response> {
    let id = parse_id::<R>(raw_id)?;
    let mut session = services.session().await?;
    R::repository(session.as_mut()).remove(&id).await?;
    session.commit().await?;

    tracing::debug!(entity = R::NAME, %id, "deleted");
    Ok((StatusCode::OK, alert_headers::<R>("deleted", id)).into_response())
}

pub fn created<R: Resource>(entity: R) -> ApiResult<Response> {
    let id = stored_id(&entity)?;
    let mut headers = alert_headers::<R>("created", id);
    let location = format!("{API_BASE}{}/{id}", R::PATH);
    if let Ok(value) = HeaderValue::from_str(&location) {
        headers.insert(header::LOCATION, value);
    }
    Ok((StatusCode::CREATED, headers, Json(entity)).into_response())
}

pub fn updated<R: Resource>(entity: R) -> ApiResult<Response> {
    let id = stored_id(&entity)?;
    Ok((StatusCode::OK, alert_headers::<R>("updated", id), Json(entity)).into_response())
}

fn stored_id<R: Resource>(entity: &R) -> ApiResult<R::Id> {
    entity
        .id()
        .ok_or_else(|| ApiError::Persistence(format!("stored {} has no identifier", R::NAME)))
}

fn alert_headers<R: Resource>(action: &str, id: R::Id) -> HeaderMap {
    let article = if R::NAME.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "An"
    } else {
        "A"
    };
    let message = if action == "created" {
        format!("{article} new {} is created with identifier {id}", R::NAME)
    } else {
        format!("{article} {} is {action} with identifier {id}", R::NAME)
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&message) {
        headers.insert(ALERT_HEADER.clone(), value);
    }
    headers.insert(PARAMS_HEADER.clone(), HeaderValue::from(id.raw()));
    headers
}

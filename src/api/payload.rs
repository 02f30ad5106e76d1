use salvo::prelude::*;
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub fn is_json(req: &Request) -> bool {
    req.content_type()
        .map(|mime| {
            mime.subtype().as_str() == "json"
                || mime.suffix().map(|s| s.as_str() == "json").unwrap_or(false)
        })
        .unwrap_or(false)
}

fn is_form(req: &Request) -> bool {
    req.content_type()
        .map(|mime| {
            mime.subtype().as_str() == "x-www-form-urlencoded" || mime.type_().as_str() == "multipart"
        })
        .unwrap_or(false)
}

pub async fn parse_json<T: DeserializeOwned>(req: &mut Request) -> Result<T, AppError> {
    Ok(req.parse_json::<T>().await?)
}

/// Read request parameters from the body when one is declared (JSON or
/// form), otherwise from the query string.
pub async fn parse_payload<T: DeserializeOwned>(req: &mut Request) -> Result<T, AppError> {
    if req.content_type().is_some() {
        Ok(req.parse_body::<T>().await?)
    } else {
        Ok(req.parse_queries::<T>()?)
    }
}

/// Every value of `key`, query string first, then form fields.
pub async fn param_values(req: &mut Request, key: &str) -> Result<Vec<String>, AppError> {
    let mut values = req.queries().get_vec(key).cloned().unwrap_or_default();
    if is_form(req) {
        let form = req.form_data().await?;
        if let Some(fields) = form.fields.get_vec(key) {
            values.extend(fields.iter().cloned());
        }
    }
    Ok(values)
}

pub async fn optional_param(req: &mut Request, key: &str) -> Result<Option<String>, AppError> {
    Ok(param_values(req, key).await?.into_iter().next())
}

pub async fn required_param(req: &mut Request, key: &str) -> Result<String, AppError> {
    optional_param(req, key)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("missing field `{}`", key)))
}

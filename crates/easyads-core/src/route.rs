// ABOUTME: Client-visible routes and their path form.
// ABOUTME: Parses "/", "/dashboard", "/create", and "/product/:id" and marks which need a session.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::ProductId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown route: {0}")]
    Unknown(String),

    #[error("invalid product id in route: {0}")]
    InvalidProductId(String),
}

/// A page the user can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Dashboard,
    CreateProduct,
    Product(ProductId),
}

impl Route {
    /// Only the landing page is reachable without a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Landing)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::CreateProduct => "/create".to_string(),
            Route::Product(id) => format!("/product/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let path = trimmed.trim_end_matches('/');

        match path {
            "" => Ok(Route::Landing),
            "/dashboard" => Ok(Route::Dashboard),
            "/create" => Ok(Route::CreateProduct),
            _ => {
                if let Some(id) = path.strip_prefix("/product/")
                    && !id.contains('/')
                {
                    return id
                        .parse::<ProductId>()
                        .map(Route::Product)
                        .map_err(|_| RouteError::InvalidProductId(id.to_string()));
                }
                Err(RouteError::Unknown(trimmed.to_string()))
            }
        }
    }
}

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::domain::PaymentMethod;

pub const METHOD_PARAM: &str = "method";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Landing,
    PaymentEntry,
    PaymentSuccess,
    PaymentFailed,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/landing",
            Self::PaymentEntry => "/payment",
            Self::PaymentSuccess => "/payment/success",
            Self::PaymentFailed => "/payment/failed",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A single fire-and-forget navigation call handed to the navigation stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub route: Route,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl NavigationRequest {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn payment_success(method: PaymentMethod) -> Self {
        Self::new(Route::PaymentSuccess).with_param(METHOD_PARAM, method.as_str())
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

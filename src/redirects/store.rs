//! # Redirect Stores
//!
//! The redirect table lives in the external store and is read through the
//! get-or-create contract: a store with no redirects yields an empty table,
//! never an error.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use super::errors::{RedirectError, RedirectResult};
use super::table::{MessageRedirect, RedirectTable};

/// Future returned by [`RedirectStore::get_or_create`].
pub type RedirectFuture<'a> =
    Pin<Box<dyn Future<Output = RedirectResult<Arc<RedirectTable>>> + Send + 'a>>;

/// Source of the redirect table.
pub trait RedirectStore: Send + Sync {
    /// Load the current table, creating an empty one if none exists.
    fn get_or_create(&self) -> RedirectFuture<'_>;
}

impl<S: RedirectStore + ?Sized> RedirectStore for Arc<S> {
    fn get_or_create(&self) -> RedirectFuture<'_> {
        (**self).get_or_create()
    }
}

/// In-memory redirect store for tests and single-process hosting
#[derive(Debug, Default)]
pub struct InMemoryRedirectStore {
    table: RwLock<RedirectTable>,
}

impl InMemoryRedirectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_redirects(redirects: impl IntoIterator<Item = MessageRedirect>) -> Self {
        Self {
            table: RwLock::new(RedirectTable::from_redirects(redirects)),
        }
    }

    pub fn upsert(&self, redirect: MessageRedirect) -> RedirectResult<Option<MessageRedirect>> {
        let mut table = self
            .table
            .write()
            .map_err(|_| RedirectError::Unavailable("redirect table lock poisoned".into()))?;
        Ok(table.upsert(redirect))
    }

    pub fn remove(&self, from_physical_address: &str) -> RedirectResult<Option<MessageRedirect>> {
        let mut table = self
            .table
            .write()
            .map_err(|_| RedirectError::Unavailable("redirect table lock poisoned".into()))?;
        Ok(table.remove(from_physical_address))
    }
}

impl RedirectStore for InMemoryRedirectStore {
    fn get_or_create(&self) -> RedirectFuture<'_> {
        let snapshot = self
            .table
            .read()
            .map(|table| Arc::new(table.clone()))
            .map_err(|_| RedirectError::Unavailable("redirect table lock poisoned".into()));
        Box::pin(async move { snapshot })
    }
}

/// Caches the table of an inner store until explicitly invalidated.
///
/// Whoever changes redirects is responsible for calling [`invalidate`].
///
/// [`invalidate`]: CachedRedirectStore::invalidate
#[derive(Debug)]
pub struct CachedRedirectStore<S> {
    inner: S,
    cached: RwLock<Option<Arc<RedirectTable>>>,
}

impl<S: RedirectStore> CachedRedirectStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cached: RwLock::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the cached table; the next load reads the inner store.
    pub fn invalidate(&self) {
        if let Ok(mut cached) = self.cached.write() {
            *cached = None;
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cached.read().map(|c| c.is_some()).unwrap_or(false)
    }

    fn cached(&self) -> Option<Arc<RedirectTable>> {
        self.cached.read().ok().and_then(|c| c.clone())
    }
}

impl<S: RedirectStore> RedirectStore for CachedRedirectStore<S> {
    fn get_or_create(&self) -> RedirectFuture<'_> {
        Box::pin(async move {
            if let Some(table) = self.cached() {
                return Ok(table);
            }

            let table = self.inner.get_or_create().await?;
            if let Ok(mut cached) = self.cached.write() {
                *cached = Some(Arc::clone(&table));
            }
            Ok(table)
        })
    }
}

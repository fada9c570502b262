//! Cart reconciliation controller.
//!
//! The controller is the only thing the presentation layer talks to. It decides which store is
//! authoritative from the auth signal, exposes the same asynchronous mutation API in both
//! modes, and moves the guest cart into the account cart once per login.
//!
//! All operations are serialized through a single async mutex: mutations apply in call order,
//! and a migration in progress holds the lock so mutations issued meanwhile run afterwards
//! against the server cart.

mod config;
mod errors;
mod notice;

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    future::Future,
    sync::Arc,
};

use tokio::{
    sync::{Mutex, broadcast, watch},
    time::timeout,
};
use tracing::{debug, info, warn};

use crate::{
    cart::Cart,
    local::{LocalCartStore, Storage},
    products::{ProductId, ProductSnapshot},
    server::{ServerCartError, ServerCartStore, line_quantity, validate_product},
    users::UserId,
};

pub use config::ControllerConfig;
pub use errors::CartError;
pub use notice::{CartNotice, CartView};

/// Current user as reported by the session layer; `None` while signed out.
pub type AuthSignal = watch::Receiver<Option<UserId>>;

const NOTICE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Anonymous,
    Authenticated(UserId),
}

#[derive(Debug)]
struct Session {
    mode: Mode,
    cart: Cart,
    /// User the server refused; ignored until the auth signal changes.
    rejected: Option<UserId>,
}

#[derive(Debug, Clone)]
enum Mutation {
    Add(ProductSnapshot),
    Remove(ProductId),
    SetQuantity(ProductId, u32),
    Clear,
}

impl Mutation {
    fn product(&self) -> Option<ProductId> {
        match self {
            Self::Add(product) => Some(product.id),
            Self::Remove(product) | Self::SetQuantity(product, _) => Some(*product),
            Self::Clear => None,
        }
    }
}

/// Routes cart mutations to the local or server store and migrates on login.
pub struct CartController {
    local: LocalCartStore,
    server: Arc<dyn ServerCartStore>,
    auth: AuthSignal,
    session: Mutex<Session>,
    view: watch::Sender<CartView>,
    notices: broadcast::Sender<CartNotice>,
    config: ControllerConfig,
}

impl Debug for CartController {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartController")
            .field("local", &self.local)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CartController {
    /// Create a controller in anonymous mode, showing whatever the local store holds.
    ///
    /// A user already present on the auth signal is treated as a fresh login on the first
    /// operation (or [`CartController::sync_auth`]).
    pub fn new(
        storage: Arc<dyn Storage>,
        server: Arc<dyn ServerCartStore>,
        auth: AuthSignal,
        config: ControllerConfig,
    ) -> Self {
        let local = LocalCartStore::new(storage, config.storage_key.clone());
        let cart = local.load();

        let (view, _initial) = watch::channel(CartView {
            cart: cart.clone(),
            is_authenticated: false,
        });

        let (notices, _initial) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            local,
            server,
            auth,
            session: Mutex::new(Session {
                mode: Mode::Anonymous,
                cart,
                rejected: None,
            }),
            view,
            notices,
            config,
        }
    }

    /// The current cart.
    pub fn cart(&self) -> Cart {
        self.view.borrow().cart.clone()
    }

    /// The current cart and mode flag.
    pub fn view(&self) -> CartView {
        self.view.borrow().clone()
    }

    /// Whether the server cart is in use. For messaging only; routing happens internally.
    pub fn is_authenticated(&self) -> bool {
        self.view.borrow().is_authenticated
    }

    /// Receive every published cart view.
    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.view.subscribe()
    }

    /// Receive transient notices meant for the user.
    pub fn notices(&self) -> broadcast::Receiver<CartNotice> {
        self.notices.subscribe()
    }

    /// Add one unit of a product, inserting it when absent.
    ///
    /// # Errors
    ///
    /// See [`CartError`].
    pub async fn add_item(&self, product: &ProductSnapshot) -> Result<Cart, CartError> {
        validate_product(product.id).map_err(into_validation)?;

        self.apply(Mutation::Add(product.clone())).await
    }

    /// Remove a product's line. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// See [`CartError`].
    pub async fn remove_item(&self, product: ProductId) -> Result<Cart, CartError> {
        validate_product(product).map_err(into_validation)?;

        self.apply(Mutation::Remove(product)).await
    }

    /// Set the absolute quantity of a product's line; `quantity <= 0` removes it.
    ///
    /// Signed out, updating a product that is not in the cart changes nothing. Signed in, the
    /// server reports it as [`CartError::NotFound`].
    ///
    /// # Errors
    ///
    /// See [`CartError`].
    pub async fn update_quantity(&self, product: ProductId, quantity: i64) -> Result<Cart, CartError> {
        validate_product(product).map_err(into_validation)?;

        let mutation = match line_quantity(quantity).map_err(into_validation)? {
            None => Mutation::Remove(product),
            Some(quantity) => Mutation::SetQuantity(product, quantity),
        };

        self.apply(mutation).await
    }

    /// Remove every line from the active cart.
    ///
    /// # Errors
    ///
    /// See [`CartError`].
    pub async fn clear(&self) -> Result<Cart, CartError> {
        self.apply(Mutation::Clear).await
    }

    /// Apply any pending login or logout now, returning the resulting view.
    pub async fn sync_auth(&self) -> CartView {
        let mut session = self.session.lock().await;

        self.reconcile(&mut session).await;
        self.publish(&session)
    }

    /// Re-read the active store.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Transient`] when the server cart cannot be fetched; the previous
    /// view is kept.
    pub async fn refresh(&self) -> Result<Cart, CartError> {
        let mut session = self.session.lock().await;

        self.reconcile(&mut session).await;

        let result = match session.mode {
            Mode::Anonymous => {
                session.cart = self.local.load();

                Ok(())
            }
            Mode::Authenticated(user) => match self.reload_server(&mut session, user).await {
                Ok(()) => Ok(()),
                Err(ServerCartError::Unauthenticated) => {
                    self.fall_back_to_local(&mut session, user);

                    Ok(())
                }
                Err(error) => {
                    warn!(%user, %error, "failed to refresh server cart");

                    self.notify(CartNotice::SyncFailed {
                        reason: error.to_string(),
                    });

                    Err(CartError::Transient(error))
                }
            },
        };

        self.publish(&session);

        result.map(|()| session.cart.clone())
    }

    /// Follow the auth signal until it closes, applying each login or logout as it happens.
    pub async fn watch_auth(self: Arc<Self>) {
        let mut auth = self.auth.clone();

        self.sync_auth().await;

        while auth.changed().await.is_ok() {
            self.sync_auth().await;
        }

        debug!("auth signal closed");
    }

    async fn apply(&self, mutation: Mutation) -> Result<Cart, CartError> {
        let mut session = self.session.lock().await;

        self.reconcile(&mut session).await;

        let result = match session.mode {
            Mode::Anonymous => {
                self.apply_local(&mut session, &mutation);

                Ok(())
            }
            Mode::Authenticated(user) => self.apply_remote(&mut session, user, &mutation).await,
        };

        self.publish(&session);

        result.map(|()| session.cart.clone())
    }

    fn apply_local(&self, session: &mut Session, mutation: &Mutation) {
        debug!(?mutation, "applying mutation to local cart");

        match mutation {
            Mutation::Add(product) => session.cart.add(product, 1),
            Mutation::Remove(product) => {
                session.cart.remove(*product);
            }
            Mutation::SetQuantity(product, quantity) => {
                session.cart.set_quantity(*product, *quantity);
            }
            Mutation::Clear => {
                session.cart.clear();
                self.local.clear();

                return;
            }
        }

        self.local.save(&session.cart);
    }

    async fn apply_remote(
        &self,
        session: &mut Session,
        user: UserId,
        mutation: &Mutation,
    ) -> Result<(), CartError> {
        debug!(%user, ?mutation, "applying mutation to server cart");

        let request = match mutation {
            Mutation::Add(product) => self.server.add_item(user, product.id, 1),
            Mutation::Remove(product) => self.server.remove_item(user, *product),
            Mutation::SetQuantity(product, quantity) => {
                self.server
                    .set_quantity(user, *product, i64::from(*quantity))
            }
            Mutation::Clear => self.server.clear(user),
        };

        match self.bounded(request).await {
            Ok(cart) => {
                session.cart = cart;

                Ok(())
            }
            Err(ServerCartError::Unauthenticated) => {
                self.fall_back_to_local(session, user);
                self.apply_local(session, mutation);

                Ok(())
            }
            Err(ServerCartError::Validation(reason)) => Err(CartError::Validation(reason)),
            Err(ServerCartError::NotFound) => {
                // The view may be stale (another device changed the cart); resync quietly.
                if let Err(error) = self.reload_server(session, user).await {
                    debug!(%user, %error, "keeping last known-good cart");
                }

                match mutation.product() {
                    Some(product) => Err(CartError::NotFound(product)),
                    None => Ok(()),
                }
            }
            Err(error) => {
                self.recover(session, user, &error).await;

                Err(CartError::Transient(error))
            }
        }
    }

    /// Bring the session's mode in line with the auth signal.
    async fn reconcile(&self, session: &mut Session) {
        let signal = *self.auth.borrow();

        if session.rejected.is_some() && session.rejected != signal {
            session.rejected = None;
        }

        let desired = signal.filter(|user| session.rejected != Some(*user));

        match (session.mode, desired) {
            (Mode::Anonymous, Some(user)) => self.migrate(session, user).await,
            (Mode::Authenticated(user), None) => self.enter_anonymous(session, user),
            (Mode::Authenticated(current), Some(user)) if current != user => {
                self.enter_anonymous(session, current);
                self.migrate(session, user).await;
            }
            _ => {}
        }
    }

    fn enter_anonymous(&self, session: &mut Session, user: UserId) {
        info!(%user, "signed out, switching to local cart");

        session.mode = Mode::Anonymous;
        session.cart = self.local.load();
    }

    /// Move every local line into the user's server cart, then clear the local store.
    ///
    /// Lines are added in list order. A failing line is logged and skipped; the local store is
    /// cleared regardless. Only an authentication failure stops the migration: lines the server
    /// already accepted leave the local cart, the rest stay for the next login, and the session
    /// remains anonymous.
    ///
    /// The session shows the server's answer afterwards: the reloaded cart, or the last
    /// `add_item` response when the reload fails.
    async fn migrate(&self, session: &mut Session, user: UserId) {
        let pending: Vec<(ProductId, u32)> = session
            .cart
            .items()
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect();

        info!(%user, lines = pending.len(), "signed in, migrating local cart");

        let mut migrated = Vec::new();
        let mut failed = Vec::new();
        let mut last_known = None;

        for (product, quantity) in pending {
            match self
                .bounded(self.server.add_item(user, product, quantity))
                .await
            {
                Ok(cart) => {
                    migrated.push(product);
                    last_known = Some(cart);
                }
                Err(ServerCartError::Unauthenticated) => {
                    for product in &migrated {
                        session.cart.remove(*product);
                    }

                    self.local.save(&session.cart);
                    self.fall_back_to_local(session, user);

                    return;
                }
                Err(error) => {
                    warn!(%user, %product, quantity, %error, "failed to migrate cart line");

                    failed.push(product);
                }
            }
        }

        self.local.clear();
        session.mode = Mode::Authenticated(user);
        session.cart = last_known.unwrap_or_default();

        if !failed.is_empty() {
            self.notify(CartNotice::MigrationIncomplete { failed });
        }

        match self.reload_server(session, user).await {
            Ok(()) => {}
            Err(ServerCartError::Unauthenticated) => self.fall_back_to_local(session, user),
            Err(error) => {
                warn!(%user, %error, "failed to load server cart after migration");

                self.notify(CartNotice::SyncFailed {
                    reason: error.to_string(),
                });
            }
        }
    }

    async fn reload_server(&self, session: &mut Session, user: UserId) -> Result<(), ServerCartError> {
        session.cart = self.bounded(self.server.get_or_create(user)).await?;

        Ok(())
    }

    /// Tell the user about a failed server operation and restore the last known-good cart.
    async fn recover(&self, session: &mut Session, user: UserId, error: &ServerCartError) {
        warn!(%user, %error, "server cart operation failed");

        self.notify(CartNotice::SyncFailed {
            reason: error.to_string(),
        });

        match self.reload_server(session, user).await {
            Ok(()) => {}
            Err(ServerCartError::Unauthenticated) => self.fall_back_to_local(session, user),
            Err(reload_error) => {
                debug!(%user, %reload_error, "keeping last known-good cart");
            }
        }
    }

    fn fall_back_to_local(&self, session: &mut Session, user: UserId) {
        warn!(%user, "server rejected the session, using local cart");

        if session.mode != Mode::Anonymous {
            session.cart = self.local.load();
        }

        session.mode = Mode::Anonymous;
        session.rejected = Some(user);

        self.notify(CartNotice::SessionExpired);
    }

    async fn bounded<F>(&self, request: F) -> Result<Cart, ServerCartError>
    where
        F: Future<Output = Result<Cart, ServerCartError>>,
    {
        timeout(self.config.server_timeout(), request)
            .await
            .unwrap_or(Err(ServerCartError::Timeout))
    }

    fn publish(&self, session: &Session) -> CartView {
        let view = CartView {
            cart: session.cart.clone(),
            is_authenticated: matches!(session.mode, Mode::Authenticated(_)),
        };

        self.view.send_replace(view.clone());

        view
    }

    fn notify(&self, notice: CartNotice) {
        if self.notices.send(notice).is_err() {
            debug!("no notice subscribers");
        }
    }
}

fn into_validation(error: ServerCartError) -> CartError {
    match error {
        ServerCartError::Validation(reason) => CartError::Validation(reason),
        other => CartError::Validation(other.to_string()),
    }
}

//! Authorization policies

use super::context::AuthContext;

/// Decides whether a request may proceed.
///
/// Invoked once per operation, synchronously, before the target path is
/// resolved or the filesystem is touched.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, ctx: &AuthContext<'_>) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&AuthContext<'_>) -> bool + Send + Sync,
{
    fn authorize(&self, ctx: &AuthContext<'_>) -> bool {
        self(ctx)
    }
}

/// Permits everything. Used when no users are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _ctx: &AuthContext<'_>) -> bool {
        true
    }
}

/// Authenticated callers may do anything; anonymous callers may only read,
/// and only when `anonymous_read` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireLogin {
    pub anonymous_read: bool,
}

impl Authorizer for RequireLogin {
    fn authorize(&self, ctx: &AuthContext<'_>) -> bool {
        if ctx.caller.is_authenticated() {
            return true;
        }
        self.anonymous_read && !ctx.operation.is_mutating()
    }
}

use hyper::upgrade::OnUpgrade;
use hyper::Request;

use crate::domain::{ProxyError, Result};

/// Detaches the raw connection handle from a request.
///
/// The handle is only present when the connection is served with upgrade
/// support; without it the request cannot be hijacked and the caller must
/// answer over HTTP instead.
pub fn hijack<B>(req: &mut Request<B>) -> Result<OnUpgrade> {
    req.extensions_mut()
        .remove::<OnUpgrade>()
        .ok_or(ProxyError::HijackUnsupported)
}

pub mod attempt_handler;
pub mod eligibility_handler;

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;

/// Best-effort client address: proxy headers first (via actix's
/// ConnectionInfo), then the raw peer address. `None` when neither parses;
/// the eligibility evaluator treats that as a failed IP predicate whenever
/// an allow-list is configured.
pub(crate) fn client_ip(req: &HttpRequest) -> Option<IpAddr> {
    let info = req.connection_info();
    if let Some(raw) = info.realip_remote_addr() {
        if let Ok(ip) = raw.parse::<IpAddr>() {
            return Some(ip);
        }
        if let Ok(addr) = raw.parse::<SocketAddr>() {
            return Some(addr.ip());
        }
    }
    req.peer_addr().map(|addr| addr.ip())
}

use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use log::debug;
use regex::Regex;

use crate::config::ServerOptions;

/// Best-effort client address for the callback audit log. The mobile-money callback carries no signature, so this
/// address is the only provenance recorded for a delivery.
///
/// Proxy headers are trusted only when the matching [`ServerOptions`] flag is set, meaning an operator has confirmed
/// a proxy in front of the server rewrites them. `X-Forwarded-For` wins over `Forwarded`; with neither flag set (or
/// neither header parseable) the socket peer address is used.
pub fn client_addr(req: &HttpRequest, options: ServerOptions) -> Option<IpAddr> {
    let forwarded = (options.use_x_forwarded_for.then(|| x_forwarded_for(req)).flatten())
        .or_else(|| options.use_forwarded.then(|| forwarded_header(req)).flatten());
    if let Some(ip) = forwarded {
        debug!("Client address {ip} taken from a proxy header");
        return Some(ip);
    }
    req.connection_info().peer_addr().and_then(|addr| IpAddr::from_str(addr).ok())
}

fn x_forwarded_for(req: &HttpRequest) -> Option<IpAddr> {
    let value = req.headers().get("X-Forwarded-For")?.to_str().ok()?;
    // Proxies append; the left-most entry is the original client.
    let first = value.split(',').next()?.trim();
    IpAddr::from_str(first).ok()
}

fn forwarded_header(req: &HttpRequest) -> Option<IpAddr> {
    let value = req.headers().get("Forwarded")?.to_str().ok()?;
    let re = Regex::new(r#"for="?(?P<addr>[^";,]+)"?"#).ok()?;
    let addr = re.captures(value)?.name("addr")?.as_str().trim();
    IpAddr::from_str(addr).ok()
}

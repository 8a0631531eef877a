use std::net::SocketAddr;

/// Resolves the `SERVER_NAME` for a bound address.
///
/// A wildcard bind reports the fully qualified name of the local host. A
/// concrete address is reverse-resolved. When resolution fails the short
/// host name (wildcard) or the numeric address is used.
pub fn resolve_server_name(addr: &SocketAddr) -> String {
    let resolved = if addr.ip().is_unspecified() {
        local_hostname().map(|name| fully_qualified(&name).unwrap_or(name))
    } else {
        reverse_lookup(addr)
    };

    resolved
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}

#[cfg(unix)]
fn local_hostname() -> Option<String> {
    let mut buf = [0 as libc::c_char; 256];

    let rc = unsafe { libc::gethostname(buf.as_mut_ptr(), buf.len() - 1) };
    if rc != 0 {
        return None;
    }

    let name = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
    Some(name.to_string_lossy().into_owned())
}

/// Canonical dotted name of `host`.
///
/// Asks the resolver for the canonical name first, then reverse-resolves
/// each of the host's addresses. Only names containing a dot count.
#[cfg(unix)]
fn fully_qualified(host: &str) -> Option<String> {
    use std::ffi::{CStr, CString};
    use std::mem::zeroed;

    let node = CString::new(host).ok()?;

    let mut hints: libc::addrinfo = unsafe { zeroed() };
    hints.ai_family = libc::AF_UNSPEC;
    hints.ai_socktype = libc::SOCK_STREAM;
    hints.ai_flags = libc::AI_CANONNAME;

    let mut res: *mut libc::addrinfo = std::ptr::null_mut();
    let rc = unsafe { libc::getaddrinfo(node.as_ptr(), std::ptr::null(), &hints, &mut res) };
    if rc != 0 || res.is_null() {
        return None;
    }

    let mut found = None;
    let mut cursor = res;
    while !cursor.is_null() && found.is_none() {
        let info = unsafe { &*cursor };

        if !info.ai_canonname.is_null() {
            let canon = unsafe { CStr::from_ptr(info.ai_canonname) }
                .to_string_lossy()
                .into_owned();
            if canon.contains('.') {
                found = Some(canon);
            }
        }

        if found.is_none() && !info.ai_addr.is_null() {
            found = name_info(info.ai_addr, info.ai_addrlen).filter(|name| name.contains('.'));
        }

        cursor = info.ai_next;
    }

    unsafe { libc::freeaddrinfo(res) };
    found
}

#[cfg(unix)]
fn reverse_lookup(addr: &SocketAddr) -> Option<String> {
    use std::mem::{size_of, zeroed};

    match addr {
        SocketAddr::V4(v4) => {
            let mut sin: libc::sockaddr_in = unsafe { zeroed() };
            sin.sin_family = libc::AF_INET as libc::sa_family_t;
            sin.sin_port = v4.port().to_be();
            sin.sin_addr = libc::in_addr {
                s_addr: u32::from_ne_bytes(v4.ip().octets()),
            };
            name_info(
                &sin as *const libc::sockaddr_in as *const libc::sockaddr,
                size_of::<libc::sockaddr_in>() as libc::socklen_t,
            )
        }
        SocketAddr::V6(v6) => {
            let mut sin6: libc::sockaddr_in6 = unsafe { zeroed() };
            sin6.sin6_family = libc::AF_INET6 as libc::sa_family_t;
            sin6.sin6_port = v6.port().to_be();
            sin6.sin6_flowinfo = v6.flowinfo();
            sin6.sin6_scope_id = v6.scope_id();
            sin6.sin6_addr = libc::in6_addr {
                s6_addr: v6.ip().octets(),
            };
            name_info(
                &sin6 as *const libc::sockaddr_in6 as *const libc::sockaddr,
                size_of::<libc::sockaddr_in6>() as libc::socklen_t,
            )
        }
    }
}

/// `getnameinfo` host lookup; yields the numeric form when no name is known.
#[cfg(unix)]
fn name_info(sa: *const libc::sockaddr, len: libc::socklen_t) -> Option<String> {
    const HOST_MAX: usize = 1025;
    let mut host = [0 as libc::c_char; HOST_MAX];

    let rc = unsafe {
        libc::getnameinfo(
            sa,
            len,
            host.as_mut_ptr(),
            HOST_MAX as _,
            std::ptr::null_mut(),
            0,
            0,
        )
    };
    if rc != 0 {
        return None;
    }

    let name = unsafe { std::ffi::CStr::from_ptr(host.as_ptr()) };
    Some(name.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn local_hostname() -> Option<String> {
    None
}

#[cfg(not(unix))]
fn fully_qualified(_host: &str) -> Option<String> {
    None
}

#[cfg(not(unix))]
fn reverse_lookup(_addr: &SocketAddr) -> Option<String> {
    None
}

//! Scan-root derivation from printer hostname and model.
//!
//! Supported models expose scans on a fixed vendor subpath of their
//! removable-storage share. Unsupported models yield an empty root; the
//! walker treats an empty root as an empty listing, so a cycle against an
//! unknown model is a clean no-op.

/// Vendor subpath on the share where Epson scanners store scans.
const EPSON_SCAN_PATH: &str = "MEMORYCARD/EPSCAN";

/// Derive the SMB scan root for a printer.
///
/// Returns `smb://<hostname>/MEMORYCARD/EPSCAN` for the Epson model
/// family (substring match on `model`), or an empty string for
/// unsupported models.
#[must_use]
pub fn scan_root(hostname: &str, model: &str) -> String {
    if model.contains("epson") {
        format!("smb://{hostname}/{EPSON_SCAN_PATH}")
    } else {
        String::new()
    }
}

/// Derive the scan root for a share mounted into the local filesystem.
///
/// The mount point is expected to be the removable-storage share itself
/// (`MEMORYCARD`), so only the vendor scan directory remains. Returns an
/// empty string for unsupported models.
#[must_use]
pub fn mounted_scan_root(model: &str) -> String {
    if model.contains("epson") {
        "/EPSCAN".to_owned()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_scan_root_epson() {
        assert_eq!(
            scan_root("printer.lan", "epson"),
            "smb://printer.lan/MEMORYCARD/EPSCAN"
        );
    }

    #[test]
    fn test_scan_root_epson_variant() {
        // Substring match covers model strings like "epson-et2750".
        assert_eq!(
            scan_root("10.0.0.5", "epson-et2750"),
            "smb://10.0.0.5/MEMORYCARD/EPSCAN"
        );
    }

    #[test]
    fn test_scan_root_unsupported_model() {
        assert_eq!(scan_root("printer.lan", "brother"), "");
    }

    #[test]
    fn test_mounted_scan_root() {
        assert_eq!(mounted_scan_root("epson"), "/EPSCAN");
        assert_eq!(mounted_scan_root("hp"), "");
    }
}

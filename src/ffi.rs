//! C-compatible FFI API for cross-language bindings.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names. Invoices cross the boundary as UTF-8 JSON
//! in the same shape [`Invoice::from_json`] accepts.
//!
//! ## Memory management
//! - Buffers returned by `ifg_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `ifg_free_buffer` / `ifg_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error).
//! - Error details can be retrieved via `ifg_last_error`.
//!
//! ## Thread safety
//! - `ifg_last_error` uses a thread-local, so renders may run on several
//!   threads at once.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;
use std::time::Duration;

use crate::layout_config::LayoutConfig;
use crate::model::Invoice;
use crate::pipeline::{compute_layout_config, render_invoice_to_vec, RenderConfig};
use crate::render::render_pdf;

const ERR_NULL: c_int = 1;
const ERR_INPUT: c_int = 2;
const ERR_RENDER: c_int = 3;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

// ---------------------------------------------------------------------------
// C-compatible configuration
// ---------------------------------------------------------------------------

/// Optional render settings passed to the `*_ex` functions.
///
/// Zero / `NULL` fields fall back to their defaults:
/// - `title`                → "Invoice"
/// - `signature_timeout_ms` → 10000
#[repr(C)]
pub struct IfgRenderConfig {
    /// Null-terminated UTF-8 document title embedded in PDF metadata.
    pub title: *const c_char,
    /// Signature download timeout in milliseconds.
    pub signature_timeout_ms: u32,
    /// Render without a signature even when the invoice names one.
    pub skip_signature: bool,
}

/// # Safety
/// `cfg.title`, if non-null, must point to a valid null-terminated string.
unsafe fn render_config_from_c(cfg: *const IfgRenderConfig) -> RenderConfig {
    let defaults = RenderConfig::default();
    let Some(cfg) = cfg.as_ref() else {
        return defaults;
    };

    let title = if cfg.title.is_null() {
        defaults.title.clone()
    } else {
        CStr::from_ptr(cfg.title).to_string_lossy().into_owned()
    };
    let signature_timeout = if cfg.signature_timeout_ms == 0 {
        defaults.signature_timeout
    } else {
        Duration::from_millis(u64::from(cfg.signature_timeout_ms))
    };

    RenderConfig {
        title,
        signature_timeout,
        fetch_signature: !cfg.skip_signature,
        ..defaults
    }
}

/// # Safety
/// `json_ptr` must point to `json_len` readable bytes.
unsafe fn read_invoice(json_ptr: *const u8, json_len: u32) -> Result<Invoice, c_int> {
    let bytes = slice::from_raw_parts(json_ptr, json_len as usize);
    let json = std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        ERR_INPUT
    })?;
    Invoice::from_json(json).map_err(|e| {
        set_last_error(&e.to_string());
        ERR_INPUT
    })
}

/// # Safety
/// `out_buf` and `out_len` must be valid for writes.
unsafe fn hand_over_buffer(bytes: Vec<u8>, out_buf: *mut *mut u8, out_len: *mut u32) {
    let len = bytes.len() as u32;
    let buf = bytes.into_boxed_slice();
    *out_buf = Box::into_raw(buf) as *mut u8;
    *out_len = len;
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Render an invoice given as JSON into PDF bytes with default settings.
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `ifg_last_error`.
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `ifg_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn ifg_render_invoice(
    json_ptr: *const u8,
    json_len: u32,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    ifg_render_invoice_ex(json_ptr, json_len, ptr::null(), out_buf, out_len)
}

/// Render an invoice with a custom [`IfgRenderConfig`].
///
/// # Safety
/// Same as `ifg_render_invoice`. `cfg`, if non-null, must point to a
/// fully-initialised [`IfgRenderConfig`].
#[no_mangle]
pub unsafe extern "C" fn ifg_render_invoice_ex(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const IfgRenderConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return ERR_NULL;
    }

    let invoice = match read_invoice(json_ptr, json_len) {
        Ok(i) => i,
        Err(rc) => return rc,
    };
    let config = render_config_from_c(cfg);

    match render_invoice_to_vec(&invoice, &config) {
        Ok(pdf_bytes) => {
            hand_over_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ERR_RENDER
        }
    }
}

/// Compute only the positioned layout as JSON (no PDF encoding).
///
/// # Safety
/// Same as `ifg_render_invoice_ex`. `*out_json_ptr` must be freed with
/// `ifg_free_string`.
#[no_mangle]
pub unsafe extern "C" fn ifg_compute_layout(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const IfgRenderConfig,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || out_json_ptr.is_null() {
        set_last_error("Null pointer argument");
        return ERR_NULL;
    }

    let invoice = match read_invoice(json_ptr, json_len) {
        Ok(i) => i,
        Err(rc) => return rc,
    };
    let config = render_config_from_c(cfg);

    let layout = match compute_layout_config(&invoice, &config) {
        Ok(l) => l,
        Err(e) => {
            set_last_error(&e.to_string());
            return ERR_RENDER;
        }
    };

    match CString::new(layout.to_json()) {
        Ok(cs) => {
            *out_json_ptr = cs.into_raw();
            0
        }
        Err(_) => {
            set_last_error("JSON contained null byte");
            ERR_RENDER
        }
    }
}

/// Render a PDF from a layout JSON string produced by `ifg_compute_layout`.
///
/// # Safety
/// `json_ptr` must be a valid null-terminated string; `out_buf` and
/// `out_len` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn ifg_render_from_layout(
    json_ptr: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return ERR_NULL;
    }

    let json = match CStr::from_ptr(json_ptr).to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8 in JSON: {e}"));
            return ERR_INPUT;
        }
    };

    let layout = match LayoutConfig::from_json(json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&format!("Invalid layout JSON: {e}"));
            return ERR_INPUT;
        }
    };

    match render_pdf(&layout) {
        Ok(pdf_bytes) => {
            hand_over_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ERR_RENDER
        }
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a PDF buffer returned by `ifg_render_*`.
///
/// # Safety
/// `buf` must come from a previous `ifg_render_*` call and `len` must be the
/// length returned with it.
#[no_mangle]
pub unsafe extern "C" fn ifg_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a layout JSON string returned by `ifg_compute_layout`.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn ifg_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Last error message on this thread, or null if none occurred.
///
/// Valid until the next failing `ifg_*` call on the same thread. Do **not**
/// free it.
#[no_mangle]
pub extern "C" fn ifg_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cs) => cs.as_ptr(),
        None => ptr::null(),
    })
}

/// Library version as a static null-terminated string. Do **not** free it.
#[no_mangle]
pub extern "C" fn ifg_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

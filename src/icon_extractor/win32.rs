//! Win32 icon backend: shell lookups, resource extraction and GDI read-back.
//!
//! Every handle and GDI object lives in a guard that releases it in `Drop`.
//! Guards are declared in acquisition order, so they release in reverse.

use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, CreateCompatibleDC, CreateDIBSection, DIB_RGB_COLORS,
    DeleteDC, DeleteObject, GetDC, GetDIBits, HBITMAP, HDC, HGDIOBJ, PatBlt, ReleaseDC,
    SelectObject, WHITENESS,
};
use windows::Win32::Storage::FileSystem::FILE_FLAGS_AND_ATTRIBUTES;
use windows::Win32::UI::Shell::{
    SHDefExtractIconW, SHFILEINFOW, SHGFI_ICON, SHGFI_LARGEICON, SHGetFileInfoW,
};
use windows::Win32::UI::WindowsAndMessaging::{DI_NORMAL, DestroyIcon, DrawIconEx, HICON};
use windows::core::PCWSTR;

use super::bitmap::{self, RawBitmap};
use super::error::IconError;
use super::platform::IconPlatform;

#[derive(Debug)]
pub struct SystemIcon {
    pub hicon: HICON,
}

impl Drop for SystemIcon {
    fn drop(&mut self) {
        if !self.hicon.is_invalid() {
            // SAFETY: the handle came from a shell extraction call and is
            // owned exclusively by this guard.
            unsafe {
                let _ = DestroyIcon(self.hicon);
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Platform;

impl IconPlatform for Win32Platform {
    type Icon = SystemIcon;

    fn shell_icon(&self, path: &Path) -> Option<SystemIcon> {
        let wide_path = to_wide(path);
        let mut shfi = SHFILEINFOW::default();
        // SAFETY: `wide_path` is NUL-terminated and outlives the call; `shfi`
        // is sized as the call expects.
        let result = unsafe {
            SHGetFileInfoW(
                PCWSTR(wide_path.as_ptr()),
                FILE_FLAGS_AND_ATTRIBUTES(0),
                Some(&mut shfi),
                std::mem::size_of::<SHFILEINFOW>() as u32,
                SHGFI_ICON | SHGFI_LARGEICON,
            )
        };

        if result != 0 && !shfi.hIcon.is_invalid() {
            Some(SystemIcon { hicon: shfi.hIcon })
        } else {
            None
        }
    }

    fn resource_icon(&self, path: &Path, size: u32) -> Option<SystemIcon> {
        let wide_path = to_wide(path);
        let mut large = HICON::default();
        // SAFETY: as above; the low word of the size argument selects the
        // large icon size and only the large slot is requested.
        let result = unsafe {
            SHDefExtractIconW(
                PCWSTR(wide_path.as_ptr()),
                0,
                0,
                Some(&mut large),
                None,
                size & 0xFFFF,
            )
        };

        // S_FALSE reports success without an icon, so check the handle too.
        if result.is_ok() && !large.is_invalid() {
            Some(SystemIcon { hicon: large })
        } else {
            None
        }
    }

    fn rasterize(&self, icon: &SystemIcon, size: u32) -> Result<RawBitmap, IconError> {
        let side = size as i32;
        let screen = ScreenDc::acquire()?;
        let memory = MemoryDc::compatible_with(&screen)?;
        let mut info = bitmap_info(size);
        let surface = DibSection::create(&memory, &info)?;

        {
            let _selected = Selection::select(&memory, &surface)?;
            // SAFETY: `memory` has `surface` selected for the whole block.
            unsafe {
                if !PatBlt(memory.0, 0, 0, side, side, WHITENESS).as_bool() {
                    return Err(IconError::Rasterize("PatBlt failed".into()));
                }
                DrawIconEx(memory.0, 0, 0, icon.hicon, side, side, 0, None, DI_NORMAL)
                    .map_err(|e| IconError::Rasterize(format!("DrawIconEx: {e}")))?;
            }
        }

        // The bitmap must be deselected before GetDIBits reads it.
        let mut bits = vec![0u8; (size * size * 4) as usize];
        // SAFETY: `bits` holds exactly `size` rows of 32-bit pixels as
        // described by `info`.
        let rows = unsafe {
            GetDIBits(
                memory.0,
                surface.0,
                0,
                size,
                Some(bits.as_mut_ptr().cast()),
                &mut info,
                DIB_RGB_COLORS,
            )
        };
        if rows <= 0 {
            return Err(IconError::Rasterize("GetDIBits copied no rows".into()));
        }

        bitmap::fill_missing_alpha(&mut bits);
        Ok(RawBitmap {
            width: size,
            height: size,
            rows_read: rows as u32,
            top_down: info.bmiHeader.biHeight < 0,
            bits,
        })
    }
}

fn to_wide(path: &Path) -> Vec<u16> {
    path.as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// 32-bit top-down BGRA layout.
fn bitmap_info(size: u32) -> BITMAPINFO {
    BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: size as i32,
            biHeight: -(size as i32),
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

struct ScreenDc(HDC);

impl ScreenDc {
    fn acquire() -> Result<Self, IconError> {
        // SAFETY: a null window selects the screen DC; released in Drop.
        let hdc = unsafe { GetDC(HWND::default()) };
        if hdc.is_invalid() {
            return Err(IconError::Rasterize("GetDC failed".into()));
        }
        Ok(Self(hdc))
    }
}

impl Drop for ScreenDc {
    fn drop(&mut self) {
        // SAFETY: obtained from GetDC with the same null window.
        unsafe {
            let _ = ReleaseDC(HWND::default(), self.0);
        }
    }
}

struct MemoryDc(HDC);

impl MemoryDc {
    fn compatible_with(screen: &ScreenDc) -> Result<Self, IconError> {
        // SAFETY: `screen` holds a live DC for the duration of the call.
        let hdc = unsafe { CreateCompatibleDC(screen.0) };
        if hdc.is_invalid() {
            return Err(IconError::Rasterize("CreateCompatibleDC failed".into()));
        }
        Ok(Self(hdc))
    }
}

impl Drop for MemoryDc {
    fn drop(&mut self) {
        // SAFETY: created by CreateCompatibleDC and owned by this guard.
        unsafe {
            let _ = DeleteDC(self.0);
        }
    }
}

struct DibSection(HBITMAP);

impl DibSection {
    fn create(dc: &MemoryDc, info: &BITMAPINFO) -> Result<Self, IconError> {
        let mut bits: *mut std::ffi::c_void = std::ptr::null_mut();
        // SAFETY: `info` describes a valid 32-bit DIB; the section owns its
        // own memory, freed with the bitmap.
        let handle = unsafe { CreateDIBSection(dc.0, info, DIB_RGB_COLORS, &mut bits, None, 0) }
            .map_err(|e| IconError::Rasterize(format!("CreateDIBSection: {e}")))?;
        Ok(Self(handle))
    }
}

impl Drop for DibSection {
    fn drop(&mut self) {
        // SAFETY: no DC has it selected by the time this runs; `Selection`
        // borrows it and is always dropped first.
        unsafe {
            let _ = DeleteObject(self.0);
        }
    }
}

/// Keeps a bitmap selected into a DC, restoring the previous object on drop.
struct Selection<'a> {
    dc: &'a MemoryDc,
    previous: HGDIOBJ,
}

impl<'a> Selection<'a> {
    fn select(dc: &'a MemoryDc, surface: &'a DibSection) -> Result<Self, IconError> {
        // SAFETY: both handles are live for `'a`.
        let previous = unsafe { SelectObject(dc.0, surface.0) };
        if previous.is_invalid() {
            return Err(IconError::Rasterize("SelectObject failed".into()));
        }
        Ok(Self { dc, previous })
    }
}

impl Drop for Selection<'_> {
    fn drop(&mut self) {
        // SAFETY: `previous` was returned by SelectObject on this DC.
        unsafe {
            let _ = SelectObject(self.dc.0, self.previous);
        }
    }
}

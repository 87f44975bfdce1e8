//! The interception driver port: a user-mode DLL loaded at runtime, talking
//! to a kernel filter driver that replays strokes as hardware input.
//!
//! Nothing links against the DLL at build time. `load` resolves the entry
//! points with `LoadLibraryW`/`GetProcAddress`, so the crate runs fine on
//! machines without the driver as long as the message backend is selected.

use std::ffi::c_void;
use std::mem;
use std::path::Path;

use windows_sys::Win32::Foundation::HMODULE;
use windows_sys::Win32::System::LibraryLoader::{FreeLibrary, GetProcAddress, LoadLibraryW};

use super::wide;
use crate::encode::stroke::{KEY_STROKE_SIZE, MOUSE_STROKE_SIZE};
use crate::error::InputError;
use crate::system::{DeviceId, DriverContext, DriverPort};

type CreateContextFn = unsafe extern "C" fn() -> *mut c_void;
type DestroyContextFn = unsafe extern "C" fn(*mut c_void);
type IsDeviceFn = unsafe extern "C" fn(i32) -> i32;
type SendFn = unsafe extern "C" fn(*mut c_void, i32, *const u8, u32) -> i32;

/// Entry points resolved from one loaded library image. Immutable once
/// built; `unload` drops the whole set together with the image.
struct Symbols {
    module: HMODULE,
    create_context: CreateContextFn,
    destroy_context: DestroyContextFn,
    is_mouse: IsDeviceFn,
    is_keyboard: IsDeviceFn,
    send: SendFn,
}

// HMODULE is a process-local image handle, not thread-affine.
unsafe impl Send for Symbols {}

pub struct InterceptionPort {
    symbols: Option<Symbols>,
}

impl InterceptionPort {
    pub fn new() -> Self {
        InterceptionPort { symbols: None }
    }

    fn symbols(&self) -> Result<&Symbols, InputError> {
        self.symbols
            .as_ref()
            .ok_or_else(|| InputError::BackendUnavailable("driver library not loaded".into()))
    }
}

impl Default for InterceptionPort {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves one NUL-terminated export name to a typed function pointer.
unsafe fn resolve<T: Copy>(module: HMODULE, name: &[u8]) -> Result<T, InputError> {
    debug_assert_eq!(name.last(), Some(&0));
    match GetProcAddress(module, name.as_ptr()) {
        Some(proc) => Ok(mem::transmute_copy(&proc)),
        None => {
            let symbol = String::from_utf8_lossy(&name[..name.len() - 1]).into_owned();
            Err(InputError::DriverLoadFailed(format!(
                "missing export {symbol}"
            )))
        }
    }
}

impl DriverPort for InterceptionPort {
    fn load(&mut self, library: &Path) -> Result<(), InputError> {
        if self.symbols.is_some() {
            return Ok(());
        }
        let path = wide(&library.to_string_lossy());
        let module = unsafe { LoadLibraryW(path.as_ptr()) };
        if module.is_null() {
            return Err(InputError::DriverLoadFailed(format!(
                "could not load {}",
                library.display()
            )));
        }

        // A missing export means a foreign or truncated image; release it
        // rather than keep a half-resolved library mapped.
        let symbols = (|| -> Result<Symbols, InputError> {
            unsafe {
                Ok(Symbols {
                    module,
                    create_context: resolve(module, b"interception_create_context\0")?,
                    destroy_context: resolve(module, b"interception_destroy_context\0")?,
                    is_mouse: resolve(module, b"interception_is_mouse\0")?,
                    is_keyboard: resolve(module, b"interception_is_keyboard\0")?,
                    send: resolve(module, b"interception_send\0")?,
                })
            }
        })();
        match symbols {
            Ok(symbols) => {
                self.symbols = Some(symbols);
                Ok(())
            }
            Err(err) => {
                unsafe { FreeLibrary(module) };
                Err(err)
            }
        }
    }

    fn unload(&mut self) {
        if let Some(symbols) = self.symbols.take() {
            unsafe { FreeLibrary(symbols.module) };
        }
    }

    fn mouse_stroke_size(&self) -> usize {
        MOUSE_STROKE_SIZE
    }

    fn key_stroke_size(&self) -> usize {
        KEY_STROKE_SIZE
    }

    fn create_context(&mut self) -> Result<DriverContext, InputError> {
        let symbols = self.symbols()?;
        let context = unsafe { (symbols.create_context)() };
        if context.is_null() {
            // The DLL loads fine without the kernel component; context
            // creation is where its absence shows up.
            return Err(InputError::DriverNotInstalled);
        }
        Ok(DriverContext(context as usize))
    }

    fn destroy_context(&mut self, context: DriverContext) {
        if let Some(symbols) = self.symbols.as_ref() {
            unsafe { (symbols.destroy_context)(context.0 as *mut c_void) };
        }
    }

    fn is_mouse(&self, device: DeviceId) -> bool {
        match self.symbols.as_ref() {
            Some(symbols) => unsafe { (symbols.is_mouse)(device.0) != 0 },
            None => false,
        }
    }

    fn is_keyboard(&self, device: DeviceId) -> bool {
        match self.symbols.as_ref() {
            Some(symbols) => unsafe { (symbols.is_keyboard)(device.0) != 0 },
            None => false,
        }
    }

    fn send(
        &self,
        context: DriverContext,
        device: DeviceId,
        stroke: &[u8],
    ) -> Result<(), InputError> {
        let symbols = self.symbols()?;
        let sent = unsafe {
            (symbols.send)(
                context.0 as *mut c_void,
                device.0,
                stroke.as_ptr(),
                1,
            )
        };
        if sent != 1 {
            return Err(InputError::DeliveryFailed(format!(
                "driver rejected stroke for device {}",
                device.0
            )));
        }
        Ok(())
    }
}

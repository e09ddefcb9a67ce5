//! Gated trace macros on top of [`tracefmt`].
//!
//! A trace call goes through three process-wide hooks, each a function
//! pointer in an [`AtomicPtr`] so it can be swapped from any context
//! without locks:
//!
//! 1. the **gate**, consulted once before any argument is evaluated;
//! 2. the formatter, rendering into a stack [`MessageBuffer`] with the
//!    installed [`TagRegistry`];
//! 3. the **sink**, which receives the finished NUL-terminated message.
//!
//! ```ignore
//! const DISK: ComponentId = ComponentId(3);
//! tracefmt_log::trace_info!(DISK, "read %u bytes: %!STATUS!", len, status);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]

use core::ffi::CStr;
use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

pub use tracefmt;
pub use tracefmt::{ExecContext, TraceArg};

use tracefmt::{ArgCursor, MessageBuffer, Origin, RegistryError, RenderContext, TagRegistry};

// ---------------------------------------------------------------------------
// Levels and components
// ---------------------------------------------------------------------------

/// Trace severity level. Lower is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TraceLevel {
    /// The component cannot continue.
    Critical = 1,
    /// An operation failed.
    Error = 2,
    /// Unexpected but recoverable.
    Warning = 3,
    /// Normal progress.
    Information = 4,
    /// Detailed diagnostics.
    Verbose = 5,
}

impl TraceLevel {
    /// Every level, most severe first.
    pub const ALL: [Self; 5] = [Self::Critical, Self::Error, Self::Warning, Self::Information, Self::Verbose];

    /// Returns the human-readable name (fixed-width for aligned output).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Critical => "CRIT ",
            Self::Error => "ERROR",
            Self::Warning => "WARN ",
            Self::Information => "INFO ",
            Self::Verbose => "VERB ",
        }
    }

    /// Converts a raw level; `None` for 0 and anything above `Verbose`.
    #[must_use]
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Critical),
            2 => Some(Self::Error),
            3 => Some(Self::Warning),
            4 => Some(Self::Information),
            5 => Some(Self::Verbose),
            _ => None,
        }
    }
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_end())
    }
}

/// Identifies the component a message is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub u16);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Components with their own level slot. Higher ids use the default level.
pub const MAX_COMPONENTS: usize = 64;

/// Slot value meaning "use the default level".
const LEVEL_UNSET: u8 = u8::MAX;

/// Slot value meaning "nothing is enabled".
const LEVEL_OFF: u8 = 0;

static COMPONENT_LEVELS: [AtomicU8; MAX_COMPONENTS] = [const { AtomicU8::new(LEVEL_UNSET) }; MAX_COMPONENTS];

static DEFAULT_LEVEL: AtomicU8 = AtomicU8::new(TraceLevel::Information as u8);

/// The signature of the gating predicate.
pub type GateFn = fn(ComponentId, TraceLevel) -> bool;

/// The default gate: per-component maximum levels over a default.
#[must_use]
pub fn level_gate(component: ComponentId, level: TraceLevel) -> bool {
    let slot = COMPONENT_LEVELS
        .get(usize::from(component.0))
        .map_or(LEVEL_UNSET, |slot| slot.load(Ordering::Relaxed));
    let max = if slot == LEVEL_UNSET { DEFAULT_LEVEL.load(Ordering::Relaxed) } else { slot };
    level as u8 <= max
}

static GATE_FN: AtomicPtr<()> = AtomicPtr::new(level_gate as *mut ());

/// Registers the gating predicate.
///
/// # Safety
///
/// The provided function must be safe to call from any context the trace
/// macros are used in, and must not itself emit traces.
pub unsafe fn set_gate_fn(f: GateFn) {
    GATE_FN.store(f as *mut (), Ordering::Release);
}

#[inline]
fn load_gate_fn() -> GateFn {
    let ptr = GATE_FN.load(Ordering::Acquire);
    // SAFETY: We only ever store valid `GateFn` function pointers into GATE_FN.
    unsafe { core::mem::transmute::<*mut (), GateFn>(ptr) }
}

/// Sets the maximum level for one component; `None` disables it entirely.
///
/// Ids at or above [`MAX_COMPONENTS`] are ignored.
pub fn set_component_level(component: ComponentId, level: Option<TraceLevel>) {
    if let Some(slot) = COMPONENT_LEVELS.get(usize::from(component.0)) {
        slot.store(level.map_or(LEVEL_OFF, |l| l as u8), Ordering::Relaxed);
    }
}

/// Makes a component follow the default level again.
pub fn reset_component_level(component: ComponentId) {
    if let Some(slot) = COMPONENT_LEVELS.get(usize::from(component.0)) {
        slot.store(LEVEL_UNSET, Ordering::Relaxed);
    }
}

/// Sets the maximum level for components without their own setting.
pub fn set_default_level(level: Option<TraceLevel>) {
    DEFAULT_LEVEL.store(level.map_or(LEVEL_OFF, |l| l as u8), Ordering::Relaxed);
}

/// Returns `true` if a message at `level` for `component` would be emitted.
#[inline]
#[must_use]
pub fn is_enabled(component: ComponentId, level: TraceLevel) -> bool {
    load_gate_fn()(component, level)
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// The signature of the message sink.
pub type SinkFn = fn(ComponentId, TraceLevel, &CStr);

fn null_sink(_component: ComponentId, _level: TraceLevel, _message: &CStr) {}

static SINK_FN: AtomicPtr<()> = AtomicPtr::new(null_sink as *mut ());

/// Registers the message sink.
///
/// # Safety
///
/// The provided function must be safe to call from any context the trace
/// macros are used in. May be called more than once; uses `Release` ordering
/// so subsequent loads see the new function.
pub unsafe fn set_sink_fn(f: SinkFn) {
    SINK_FN.store(f as *mut (), Ordering::Release);
}

#[inline]
fn load_sink_fn() -> SinkFn {
    let ptr = SINK_FN.load(Ordering::Acquire);
    // SAFETY: We only ever store valid `SinkFn` function pointers into SINK_FN.
    unsafe { core::mem::transmute::<*mut (), SinkFn>(ptr) }
}

/// A sink that writes `LEVEL cN: message` lines to standard error.
#[cfg(feature = "std")]
pub fn stderr_sink(component: ComponentId, level: TraceLevel, message: &CStr) {
    eprintln!("{} {component}: {}", level.name(), message.to_string_lossy());
}

// ---------------------------------------------------------------------------
// Registry and local time
// ---------------------------------------------------------------------------

/// Error returned by [`set_registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallError {
    /// A registry was already installed.
    AlreadyInstalled,
    /// The registry failed validation.
    Invalid(RegistryError),
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled => f.write_str("a tag registry is already installed"),
            Self::Invalid(err) => write!(f, "invalid tag registry: {err}"),
        }
    }
}

impl core::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::AlreadyInstalled => None,
            Self::Invalid(err) => Some(err),
        }
    }
}

static BUILTIN_REGISTRY: TagRegistry = TagRegistry::builtin();

static REGISTRY: AtomicPtr<TagRegistry> = AtomicPtr::new(core::ptr::null_mut());

/// Installs the process-wide tag registry. Only the first call succeeds.
///
/// Until then, messages render with the built-in tags only.
///
/// # Errors
///
/// Returns [`InstallError::Invalid`] if `registry` fails
/// [`validate`](TagRegistry::validate), and
/// [`InstallError::AlreadyInstalled`] if a registry is already in place.
pub fn set_registry(registry: &'static TagRegistry) -> Result<(), InstallError> {
    registry.validate().map_err(InstallError::Invalid)?;
    let ptr = core::ptr::from_ref(registry).cast_mut();
    REGISTRY
        .compare_exchange(core::ptr::null_mut(), ptr, Ordering::AcqRel, Ordering::Acquire)
        .map(|_| ())
        .map_err(|_| InstallError::AlreadyInstalled)
}

/// The installed registry, or the built-in one.
#[must_use]
pub fn registry() -> &'static TagRegistry {
    let ptr = REGISTRY.load(Ordering::Acquire);
    // SAFETY: REGISTRY is either null or set once from a `&'static TagRegistry`.
    unsafe { ptr.as_ref() }.unwrap_or(&BUILTIN_REGISTRY)
}

/// The signature of the local-time hook used by `%!TIMESTAMP!`.
pub type LocalBiasFn = tracefmt::dispatch::LocalBiasFn;

static LOCAL_BIAS_FN: AtomicPtr<()> = AtomicPtr::new(tracefmt::dispatch::utc as *mut ());

/// Registers the local-time hook.
///
/// # Safety
///
/// The provided function must be safe to call from any context the trace
/// macros are used in.
pub unsafe fn set_local_bias_fn(f: LocalBiasFn) {
    LOCAL_BIAS_FN.store(f as *mut (), Ordering::Release);
}

#[inline]
fn load_local_bias_fn() -> LocalBiasFn {
    let ptr = LOCAL_BIAS_FN.load(Ordering::Acquire);
    // SAFETY: We only ever store valid `LocalBiasFn` function pointers into LOCAL_BIAS_FN.
    unsafe { core::mem::transmute::<*mut (), LocalBiasFn>(ptr) }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Renders and emits one message if the gate allows it.
///
/// Prefer the macros, which skip evaluating the arguments when the gate is
/// closed.
pub fn trace_message(
    component: ComponentId,
    level: TraceLevel,
    exec: ExecContext,
    origin: Origin<'_>,
    fmt: &str,
    args: &[TraceArg<'_>],
) {
    if is_enabled(component, level) {
        emit(component, level, exec, origin, fmt, args);
    }
}

/// Implementation detail for [`trace_event!`]. Not public API.
#[doc(hidden)]
pub fn _emit(
    component: ComponentId,
    level: TraceLevel,
    exec: ExecContext,
    origin: &'static str,
    fmt: &str,
    args: &[TraceArg<'_>],
) {
    emit(component, level, exec, Origin::new(origin.as_bytes()), fmt, args);
}

fn emit(
    component: ComponentId,
    level: TraceLevel,
    exec: ExecContext,
    origin: Origin<'_>,
    fmt: &str,
    args: &[TraceArg<'_>],
) {
    let ctx = RenderContext::new(registry())
        .with_origin(origin)
        .with_local_bias(load_local_bias_fn());
    let mut message = MessageBuffer::new();
    tracefmt::render(&mut message, fmt, &mut ArgCursor::new(args), &ctx, exec);
    load_sink_fn()(component, level, message.as_c_str());
}

// ---------------------------------------------------------------------------
// Macros
// ---------------------------------------------------------------------------

/// Emits a trace message.
///
/// `trace_event!(COMPONENT, Level, "format", args...)`. The level is a
/// [`TraceLevel`] variant name. Arguments are converted with
/// [`TraceArg::from`] and only evaluated when the gate is open.
#[macro_export]
macro_rules! trace_event {
    ($component:path, $level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__trace_event!($crate::ExecContext::Normal, $component, $level, $fmt $(, $arg)*)
    };
}

/// Emits a trace message from an atomic or non-preemptible context.
///
/// Tag-free messages are forwarded straight to the standard formatter.
#[macro_export]
macro_rules! trace_event_restricted {
    ($component:path, $level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__trace_event!($crate::ExecContext::Restricted, $component, $level, $fmt $(, $arg)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __trace_event {
    ($exec:expr, $component:path, $level:ident, $fmt:literal $(, $arg:expr)*) => {{
        let component: $crate::ComponentId = $component;
        let level = $crate::TraceLevel::$level;
        if $crate::is_enabled(component, level) {
            let args: &[$crate::TraceArg<'_>] = &[$($crate::TraceArg::from($arg)),*];
            $crate::_emit(
                component,
                level,
                $exec,
                $crate::tracefmt::origin!(flags: $component, level: $level),
                $fmt,
                args,
            );
        }
    }};
}

/// Emits a critical-level message (level 1).
#[macro_export]
macro_rules! trace_critical {
    ($component:path, $($arg:tt)*) => { $crate::trace_event!($component, Critical, $($arg)*) };
}

/// Emits an error-level message (level 2).
#[macro_export]
macro_rules! trace_error {
    ($component:path, $($arg:tt)*) => { $crate::trace_event!($component, Error, $($arg)*) };
}

/// Emits a warning-level message (level 3).
#[macro_export]
macro_rules! trace_warning {
    ($component:path, $($arg:tt)*) => { $crate::trace_event!($component, Warning, $($arg)*) };
}

/// Emits an information-level message (level 4).
#[macro_export]
macro_rules! trace_info {
    ($component:path, $($arg:tt)*) => { $crate::trace_event!($component, Information, $($arg)*) };
}

/// Emits a verbose-level message (level 5).
#[macro_export]
macro_rules! trace_verbose {
    ($component:path, $($arg:tt)*) => { $crate::trace_event!($component, Verbose, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use tracefmt::TagDef;
    use tracefmt::registry::MachineType;

    struct Captured {
        component: ComponentId,
        level: TraceLevel,
        text: String,
    }

    static CAPTURED: Mutex<Vec<Captured>> = Mutex::new(Vec::new());

    fn capture_sink(component: ComponentId, level: TraceLevel, message: &CStr) {
        let text = message.to_string_lossy().into_owned();
        CAPTURED.lock().unwrap().push(Captured { component, level, text });
    }

    fn install() {
        // SAFETY: the capture sink only takes a host mutex.
        unsafe { set_sink_fn(capture_sink) };
    }

    fn messages(component: ComponentId) -> Vec<(TraceLevel, String)> {
        CAPTURED
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.component == component)
            .map(|c| (c.level, c.text.clone()))
            .collect()
    }

    // Each test uses its own component id so tests can run in parallel.
    const BASIC: ComponentId = ComponentId(1);
    const GATED: ComponentId = ComponentId(2);
    const LAZY: ComponentId = ComponentId(3);
    const ORIGIN: ComponentId = ComponentId(4);
    const RESTRICTED: ComponentId = ComponentId(5);
    const DIRECT: ComponentId = ComponentId(6);
    const OUT_OF_TABLE: ComponentId = ComponentId(1000);

    #[test]
    fn macro_renders_and_sinks() {
        install();
        trace_info!(BASIC, "value %d is %!STATUS!", 5i32, 0xC000_000Du32);
        assert_eq!(
            messages(BASIC),
            [(TraceLevel::Information, "value 5 is 0xC000000D(STATUS_INVALID_PARAMETER)".to_owned())]
        );
    }

    #[test]
    fn component_levels_gate_messages() {
        install();
        set_component_level(GATED, Some(TraceLevel::Warning));
        trace_verbose!(GATED, "dropped");
        trace_info!(GATED, "dropped");
        trace_warning!(GATED, "kept %s", "w");
        trace_error!(GATED, "kept");
        set_component_level(GATED, None);
        trace_critical!(GATED, "dropped");
        reset_component_level(GATED);
        assert_eq!(
            messages(GATED),
            [(TraceLevel::Warning, "kept w".to_owned()), (TraceLevel::Error, "kept".to_owned())]
        );
    }

    #[test]
    fn closed_gate_skips_argument_evaluation() {
        static EVALUATED: AtomicUsize = AtomicUsize::new(0);
        fn counted() -> u32 {
            EVALUATED.fetch_add(1, Ordering::Relaxed);
            7
        }
        install();
        set_component_level(LAZY, Some(TraceLevel::Error));
        trace_verbose!(LAZY, "%u", counted());
        assert_eq!(EVALUATED.load(Ordering::Relaxed), 0);
        trace_error!(LAZY, "%u", counted());
        assert_eq!(EVALUATED.load(Ordering::Relaxed), 1);
        assert_eq!(messages(LAZY), [(TraceLevel::Error, "7".to_owned())]);
    }

    #[test]
    fn origin_tags_see_the_call_site() {
        install();
        trace_warning!(ORIGIN, "%!FLAGS! %!LEVEL! %!FUNC!");
        let expected = format!("ORIGIN Warning {}", module_path!());
        assert_eq!(messages(ORIGIN), [(TraceLevel::Warning, expected)]);
    }

    #[test]
    fn restricted_macro_renders_the_same() {
        install();
        trace_event_restricted!(RESTRICTED, Information, "%d-%d", 1i32, 2i32);
        trace_event_restricted!(RESTRICTED, Information, "%!IRQL!", 2u8);
        let texts: Vec<String> = messages(RESTRICTED).into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, ["1-2", "(DISPATCH_LEVEL)"]);
    }

    #[test]
    fn trace_message_checks_the_gate() {
        install();
        set_component_level(DIRECT, Some(TraceLevel::Information));
        let args = [TraceArg::from("x")];
        trace_message(DIRECT, TraceLevel::Verbose, ExecContext::Normal, Origin::EMPTY, "%s", &args);
        trace_message(DIRECT, TraceLevel::Information, ExecContext::Normal, Origin::EMPTY, "%s %!FILE!", &args);
        assert_eq!(messages(DIRECT), [(TraceLevel::Information, "x (null)".to_owned())]);
    }

    #[test]
    fn ids_outside_the_table_use_the_default() {
        set_component_level(OUT_OF_TABLE, Some(TraceLevel::Verbose));
        assert!(is_enabled(OUT_OF_TABLE, TraceLevel::Information));
        assert!(!is_enabled(OUT_OF_TABLE, TraceLevel::Verbose));
    }

    #[test]
    fn registry_installs_once() {
        static USER: [TagDef; 1] = [TagDef::primitive("TESTONLY", MachineType::U8, "<%u>")];
        static USER_REGISTRY: TagRegistry = TagRegistry::new(&USER);
        static BROKEN: [TagDef; 1] = [TagDef::alias("LOOP", "LOOP")];
        static BROKEN_REGISTRY: TagRegistry = TagRegistry::new(&BROKEN);

        assert!(matches!(set_registry(&BROKEN_REGISTRY), Err(InstallError::Invalid(_))));
        assert_eq!(set_registry(&USER_REGISTRY), Ok(()));
        assert_eq!(set_registry(&USER_REGISTRY), Err(InstallError::AlreadyInstalled));
        assert!(registry().contains(b"TESTONLY"));
        assert!(registry().contains(b"STATUS"));
    }

    #[test]
    fn level_names_are_fixed_width() {
        for level in TraceLevel::ALL {
            assert_eq!(level.name().len(), 5);
            assert_eq!(TraceLevel::from_u8(level as u8), Some(level));
        }
        assert_eq!(TraceLevel::from_u8(0), None);
        assert_eq!(TraceLevel::Warning.to_string(), "WARN");
        assert_eq!(ComponentId(7).to_string(), "c7");
    }
}

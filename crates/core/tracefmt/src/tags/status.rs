//! `%!STATUS!`: NT status codes.
//!
//! Rendered as the full 32-bit code followed by its name when known, e.g.
//! `0xC0000022(STATUS_ACCESS_DENIED)`.

/// Known status codes.
#[expect(clippy::unreadable_literal, reason = "status codes are written as documented")]
pub const STATUS_VALUES: &[(u64, &str)] = &[
    // ── Success ──────────────────────────────────────────────────────
    (0x00000000, "STATUS_SUCCESS"),
    (0x00000001, "STATUS_WAIT_1"),
    (0x00000080, "STATUS_ABANDONED"),
    (0x000000C0, "STATUS_USER_APC"),
    (0x00000101, "STATUS_ALERTED"),
    (0x00000102, "STATUS_TIMEOUT"),
    (0x00000103, "STATUS_PENDING"),
    (0x00000104, "STATUS_REPARSE"),
    (0x00000105, "STATUS_MORE_ENTRIES"),
    (0x0000010B, "STATUS_NOTIFY_CLEANUP"),
    (0x0000010C, "STATUS_NOTIFY_ENUM_DIR"),
    // ── Informational ────────────────────────────────────────────────
    (0x40000000, "STATUS_OBJECT_NAME_EXISTS"),
    (0x40000016, "STATUS_RECEIVE_PARTIAL"),
    // ── Warning ──────────────────────────────────────────────────────
    (0x80000001, "STATUS_GUARD_PAGE_VIOLATION"),
    (0x80000002, "STATUS_DATATYPE_MISALIGNMENT"),
    (0x80000003, "STATUS_BREAKPOINT"),
    (0x80000004, "STATUS_SINGLE_STEP"),
    (0x80000005, "STATUS_BUFFER_OVERFLOW"),
    (0x80000006, "STATUS_NO_MORE_FILES"),
    (0x8000001A, "STATUS_NO_MORE_ENTRIES"),
    (0x80000011, "STATUS_DEVICE_BUSY"),
    // ── Error ────────────────────────────────────────────────────────
    (0xC0000001, "STATUS_UNSUCCESSFUL"),
    (0xC0000002, "STATUS_NOT_IMPLEMENTED"),
    (0xC0000005, "STATUS_ACCESS_VIOLATION"),
    (0xC0000008, "STATUS_INVALID_HANDLE"),
    (0xC000000D, "STATUS_INVALID_PARAMETER"),
    (0xC000000E, "STATUS_NO_SUCH_DEVICE"),
    (0xC000000F, "STATUS_NO_SUCH_FILE"),
    (0xC0000010, "STATUS_INVALID_DEVICE_REQUEST"),
    (0xC0000011, "STATUS_END_OF_FILE"),
    (0xC0000013, "STATUS_NO_MEDIA_IN_DEVICE"),
    (0xC0000017, "STATUS_NO_MEMORY"),
    (0xC0000022, "STATUS_ACCESS_DENIED"),
    (0xC0000023, "STATUS_BUFFER_TOO_SMALL"),
    (0xC0000024, "STATUS_OBJECT_TYPE_MISMATCH"),
    (0xC0000033, "STATUS_OBJECT_NAME_INVALID"),
    (0xC0000034, "STATUS_OBJECT_NAME_NOT_FOUND"),
    (0xC0000035, "STATUS_OBJECT_NAME_COLLISION"),
    (0xC000003A, "STATUS_OBJECT_PATH_NOT_FOUND"),
    (0xC0000043, "STATUS_SHARING_VIOLATION"),
    (0xC000009A, "STATUS_INSUFFICIENT_RESOURCES"),
    (0xC000009C, "STATUS_DEVICE_DATA_ERROR"),
    (0xC000009D, "STATUS_DEVICE_NOT_CONNECTED"),
    (0xC000009E, "STATUS_DEVICE_POWER_FAILURE"),
    (0xC00000A2, "STATUS_MEDIA_WRITE_PROTECTED"),
    (0xC00000B5, "STATUS_IO_TIMEOUT"),
    (0xC00000BB, "STATUS_NOT_SUPPORTED"),
    (0xC000010E, "STATUS_IMAGE_ALREADY_LOADED"),
    (0xC0000120, "STATUS_CANCELLED"),
    (0xC0000184, "STATUS_INVALID_DEVICE_STATE"),
    (0xC0000185, "STATUS_IO_DEVICE_ERROR"),
    (0xC0000206, "STATUS_INVALID_BUFFER_SIZE"),
    (0xC0000225, "STATUS_NOT_FOUND"),
    (0xC00002B6, "STATUS_DEVICE_REMOVED"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique_and_32_bit() {
        for (i, (code, name)) in STATUS_VALUES.iter().enumerate() {
            assert!(*code <= u64::from(u32::MAX), "{name}");
            assert!(STATUS_VALUES[..i].iter().all(|(other, _)| other != code), "{name}");
            assert!(name.starts_with("STATUS_"));
        }
    }
}

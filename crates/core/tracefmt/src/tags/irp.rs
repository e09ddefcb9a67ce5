//! I/O request packet function codes.

/// `%!IRPMJ!`: major function codes.
pub const MAJOR_FUNCTIONS: &[(u64, &str)] = &[
    (0x00, "IRP_MJ_CREATE"),
    (0x01, "IRP_MJ_CREATE_NAMED_PIPE"),
    (0x02, "IRP_MJ_CLOSE"),
    (0x03, "IRP_MJ_READ"),
    (0x04, "IRP_MJ_WRITE"),
    (0x05, "IRP_MJ_QUERY_INFORMATION"),
    (0x06, "IRP_MJ_SET_INFORMATION"),
    (0x07, "IRP_MJ_QUERY_EA"),
    (0x08, "IRP_MJ_SET_EA"),
    (0x09, "IRP_MJ_FLUSH_BUFFERS"),
    (0x0a, "IRP_MJ_QUERY_VOLUME_INFORMATION"),
    (0x0b, "IRP_MJ_SET_VOLUME_INFORMATION"),
    (0x0c, "IRP_MJ_DIRECTORY_CONTROL"),
    (0x0d, "IRP_MJ_FILE_SYSTEM_CONTROL"),
    (0x0e, "IRP_MJ_DEVICE_CONTROL"),
    (0x0f, "IRP_MJ_INTERNAL_DEVICE_CONTROL"),
    (0x10, "IRP_MJ_SHUTDOWN"),
    (0x11, "IRP_MJ_LOCK_CONTROL"),
    (0x12, "IRP_MJ_CLEANUP"),
    (0x13, "IRP_MJ_CREATE_MAILSLOT"),
    (0x14, "IRP_MJ_QUERY_SECURITY"),
    (0x15, "IRP_MJ_SET_SECURITY"),
    (0x16, "IRP_MJ_POWER"),
    (0x17, "IRP_MJ_SYSTEM_CONTROL"),
    (0x18, "IRP_MJ_DEVICE_CHANGE"),
    (0x19, "IRP_MJ_QUERY_QUOTA"),
    (0x1a, "IRP_MJ_SET_QUOTA"),
    (0x1b, "IRP_MJ_PNP"),
];

/// `%!IRPMN!`: plug-and-play minor function codes.
pub const PNP_MINOR_FUNCTIONS: &[(u64, &str)] = &[
    (0x00, "IRP_MN_START_DEVICE"),
    (0x01, "IRP_MN_QUERY_REMOVE_DEVICE"),
    (0x02, "IRP_MN_REMOVE_DEVICE"),
    (0x03, "IRP_MN_CANCEL_REMOVE_DEVICE"),
    (0x04, "IRP_MN_STOP_DEVICE"),
    (0x05, "IRP_MN_QUERY_STOP_DEVICE"),
    (0x06, "IRP_MN_CANCEL_STOP_DEVICE"),
    (0x07, "IRP_MN_QUERY_DEVICE_RELATIONS"),
    (0x08, "IRP_MN_QUERY_INTERFACE"),
    (0x09, "IRP_MN_QUERY_CAPABILITIES"),
    (0x0a, "IRP_MN_QUERY_RESOURCES"),
    (0x0b, "IRP_MN_QUERY_RESOURCE_REQUIREMENTS"),
    (0x0c, "IRP_MN_QUERY_DEVICE_TEXT"),
    (0x0d, "IRP_MN_FILTER_RESOURCE_REQUIREMENTS"),
    (0x0f, "IRP_MN_READ_CONFIG"),
    (0x10, "IRP_MN_WRITE_CONFIG"),
    (0x11, "IRP_MN_EJECT"),
    (0x12, "IRP_MN_SET_LOCK"),
    (0x13, "IRP_MN_QUERY_ID"),
    (0x14, "IRP_MN_QUERY_PNP_DEVICE_STATE"),
    (0x15, "IRP_MN_QUERY_BUS_INFORMATION"),
    (0x16, "IRP_MN_DEVICE_USAGE_NOTIFICATION"),
    (0x17, "IRP_MN_SURPRISE_REMOVAL"),
    (0x18, "IRP_MN_QUERY_LEGACY_BUS_INFORMATION"),
    (0x19, "IRP_MN_DEVICE_ENUMERATED"),
];

/// `%!POWMN!`: power minor function codes.
pub const POWER_MINOR_FUNCTIONS: &[(u64, &str)] = &[
    (0x00, "IRP_MN_WAIT_WAKE"),
    (0x01, "IRP_MN_POWER_SEQUENCE"),
    (0x02, "IRP_MN_SET_POWER"),
    (0x03, "IRP_MN_QUERY_POWER"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(table: &[(u64, &str)], prefix: &str) {
        for (i, (value, name)) in table.iter().enumerate() {
            assert!(name.starts_with(prefix), "{name}");
            assert!(table[..i].iter().all(|(other, _)| other < value), "{name} out of order");
        }
    }

    #[test]
    fn tables_are_sorted_and_prefixed() {
        assert_well_formed(MAJOR_FUNCTIONS, "IRP_MJ_");
        assert_well_formed(PNP_MINOR_FUNCTIONS, "IRP_MN_");
        assert_well_formed(POWER_MINOR_FUNCTIONS, "IRP_MN_");
    }

    #[test]
    fn major_functions_cover_every_code() {
        assert_eq!(MAJOR_FUNCTIONS.len(), 0x1c);
        assert_eq!(MAJOR_FUNCTIONS.last(), Some(&(0x1b, "IRP_MJ_PNP")));
    }
}

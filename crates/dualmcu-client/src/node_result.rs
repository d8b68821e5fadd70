//! Per-primitive node result code mapping (§7): "node-level result codes
//! returned in confirm payloads are mapped to a richer public taxonomy...
//! via per-primitive lookup tables, because the same numeric code means
//! different things in different primitives."
//!
//! The generic table below covers the common Wirepas dual-MCU convention
//! (0 = success, low codes = parameter/access/memory failures); a handful
//! of primitives override specific codes where the firmware documents a
//! more precise meaning (stack start/stop, scratchpad, sink cost).

/// A node-level result, decoded in the context of the primitive whose
/// confirm carried it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeResult {
    /// Success; only ever produced for `raw == 0`, kept for completeness.
    Ok,
    /// A parameter in the request was out of range or otherwise invalid.
    InvalidValue,
    /// A parameter's length did not match what the primitive expects.
    InvalidLength,
    /// The request conflicts with the node's current state.
    InvalidState,
    /// The node refused the request (e.g. a protected attribute).
    AccessDenied,
    /// The node has no spare memory to honor the request.
    OutOfMemory,
    /// The stack must be stopped before this request is valid.
    StackNotStopped,
    /// The node has no role configured yet.
    RoleNotSet,
    /// No app config has been set on this node.
    NoConfig,
    /// The scratchpad image failed validation (bad CRC, bad header).
    InvalidScratchpad,
    /// The request is only valid on a sink, and this node is not one.
    NotASink,
    /// A code this mapping does not recognize for this primitive.
    Unknown(u8),
}

impl NodeResult {
    /// Decodes `raw` using the lookup table for `primitive`, falling back
    /// to the generic table for any primitive name this crate has not
    /// special-cased.
    #[must_use]
    pub fn from_raw(primitive: &'static str, raw: u8) -> Self {
        if raw == 0 {
            return Self::Ok;
        }
        match (primitive, raw) {
            ("msap_stack_start" | "msap_stack_stop", 1) => Self::StackNotStopped,
            ("msap_stack_start", 2) => Self::RoleNotSet,
            ("msap_app_config_read" | "msap_app_config_write", 1) => Self::NoConfig,
            ("msap_scratchpad_start" | "msap_scratchpad_block" | "msap_scratchpad_update", 1) => {
                Self::InvalidScratchpad
            }
            ("msap_sink_cost_read" | "msap_sink_cost_write", 1) => Self::NotASink,
            (_, 1) => Self::InvalidValue,
            (_, 2) => Self::InvalidLength,
            (_, 3) => Self::OutOfMemory,
            (_, 4) => Self::AccessDenied,
            (_, 5) => Self::InvalidState,
            _ => Self::Unknown(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_always_ok() {
        assert_eq!(NodeResult::from_raw("anything", 0), NodeResult::Ok);
    }

    #[test]
    fn stack_start_code_one_means_not_stopped() {
        assert_eq!(NodeResult::from_raw("msap_stack_start", 1), NodeResult::StackNotStopped);
    }

    #[test]
    fn generic_fallback_applies_to_unrecognized_primitives() {
        assert_eq!(NodeResult::from_raw("lsap_attribute_write", 1), NodeResult::InvalidValue);
    }

    #[test]
    fn unrecognized_code_is_preserved() {
        assert_eq!(NodeResult::from_raw("msap_stack_start", 200), NodeResult::Unknown(200));
    }
}

/// Call type tag as reported by the callTracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
    Create,
    Create2,
    SelfDestruct,
    /// Anything else, including the empty tag on synthetic frames.
    Other,
}

impl CallKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "CALL" => Self::Call,
            "CALLCODE" => Self::CallCode,
            "DELEGATECALL" => Self::DelegateCall,
            "STATICCALL" => Self::StaticCall,
            "CREATE" => Self::Create,
            "CREATE2" => Self::Create2,
            "SELFDESTRUCT" => Self::SelfDestruct,
            _ => Self::Other,
        }
    }
}

/// The output-shape category a call frame renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceVariant {
    Plain,
    Revert,
    Create,
    OutOfGas,
    Suicide,
    StackUnderflow,
    BadInstruction,
    BadJumpDestination,
    Call,
}

/// Picks the record variant for a frame's error and call type.
///
/// The arms are ordered: error conditions outrank call-type conditions, and
/// the first match wins. An error string no arm recognizes falls through to
/// the type checks, and a frame nothing matches renders as `Plain` rather
/// than failing. Note `"out of gas"` is also covered by the `gas` prefix arm
/// below it; both arms are kept so the precedence stays auditable.
pub fn classify(error: &str, kind: CallKind) -> TraceVariant {
    match (error, kind) {
        ("execution reverted", _) => TraceVariant::Revert,
        ("contract creation code storage out of gas", _) => TraceVariant::OutOfGas,
        ("max code size exceeded", _) => TraceVariant::OutOfGas,
        ("out of gas", _) => TraceVariant::OutOfGas,
        (e, _) if e.starts_with("gas") => TraceVariant::OutOfGas,
        (e, _) if e.starts_with("stack underflow") => TraceVariant::StackUnderflow,
        (e, _) if e.starts_with("invalid opcode") => TraceVariant::BadInstruction,
        ("invalid jump destination", _) => TraceVariant::BadJumpDestination,
        (_, CallKind::Create | CallKind::Create2) => TraceVariant::Create,
        (_, CallKind::SelfDestruct) => TraceVariant::Suicide,
        (_, CallKind::StaticCall | CallKind::Call | CallKind::DelegateCall) => TraceVariant::Call,
        _ => TraceVariant::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_conditions_outrank_call_type() {
        assert_eq!(
            classify("out of gas", CallKind::Call),
            TraceVariant::OutOfGas
        );
        assert_eq!(
            classify("execution reverted", CallKind::Create),
            TraceVariant::Revert
        );
    }

    #[test]
    fn error_prefixes_match() {
        assert_eq!(
            classify("gas uint64 overflow", CallKind::Other),
            TraceVariant::OutOfGas
        );
        assert_eq!(
            classify("stack underflow (3 <=> 7)", CallKind::Call),
            TraceVariant::StackUnderflow
        );
        assert_eq!(
            classify("invalid opcode: INVALID", CallKind::Call),
            TraceVariant::BadInstruction
        );
        assert_eq!(
            classify("invalid jump destination", CallKind::Call),
            TraceVariant::BadJumpDestination
        );
    }

    #[test]
    fn successful_frames_classify_by_type() {
        assert_eq!(classify("", CallKind::Create), TraceVariant::Create);
        assert_eq!(classify("", CallKind::Create2), TraceVariant::Create);
        assert_eq!(classify("", CallKind::SelfDestruct), TraceVariant::Suicide);
        assert_eq!(classify("", CallKind::Call), TraceVariant::Call);
        assert_eq!(classify("", CallKind::StaticCall), TraceVariant::Call);
        assert_eq!(classify("", CallKind::DelegateCall), TraceVariant::Call);
    }

    #[test]
    fn unknown_inputs_degrade_to_plain() {
        assert_eq!(classify("", CallKind::Other), TraceVariant::Plain);
        // CALLCODE is deliberately absent from the call-type arm.
        assert_eq!(classify("", CallKind::CallCode), TraceVariant::Plain);
        assert_eq!(
            classify("some brand new error", CallKind::Other),
            TraceVariant::Plain
        );
    }
}

//! Request and reply messages for `jp4cli.CmdHandler`.
//!
//! These mirror `proto/jp4cli.proto` field-for-field. Both messages carry a
//! single string at tag 1; the agent parses the command line itself.

/// A command line typed by the operator, sent verbatim.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CmdRequest {
    #[prost(string, tag = "1")]
    pub cmdstr: ::prost::alloc::string::String,
}

impl CmdRequest {
    pub fn new(cmdstr: impl Into<String>) -> Self {
        Self {
            cmdstr: cmdstr.into(),
        }
    }
}

/// The agent's textual output for one command.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CmdReply {
    #[prost(string, tag = "1")]
    pub cmdout: ::prost::alloc::string::String,
}

impl CmdReply {
    pub fn new(cmdout: impl Into<String>) -> Self {
        Self {
            cmdout: cmdout.into(),
        }
    }
}

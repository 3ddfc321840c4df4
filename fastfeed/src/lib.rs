/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FastFeed
//!
//! A FAST/FIX market-data feed handler for Rust.
//!
//! FastFeed consumes FAST-encoded incremental updates over UDP multicast and
//! keeps a FIX tag=value session over TCP for snapshots and gap recovery.
//!
//! ## Features
//!
//! - **Template-driven decoding**: JSON template catalogs with Copy/Tail/Delta operators
//! - **Per-channel state**: Field dictionaries and sequence tracking owned by each channel
//! - **Sans-IO session**: The session state machine takes time as input and returns actions
//! - **Async runtime**: Built on Tokio with cancellable tasks and channel handoff
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fastfeed::prelude::*;
//!
//! let catalog = TemplateCatalog::from_path("templates.json")?;
//! let (handler, mut events) = FeedBuilder::new()
//!     .with_catalog(catalog)
//!     .with_multicast(MulticastConfig::new("239.1.1.1".parse()?, 30001))
//!     .with_session(SessionConfig::new("feed.example.com", 9000))
//!     .start()
//!     .await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! handler.shutdown().await;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Fundamental types, tags, events and error definitions
//! - [`dictionary`]: Template catalog and field descriptors
//! - [`tagvalue`]: FIX tag=value messages for the reliable channel
//! - [`session`]: Session state machine, sequence tracking and recovery
//! - [`transport`]: Frame codec, TCP connect and multicast join
//! - [`fast`]: FAST varints, presence maps, operators and the message decoder
//! - [`engine`]: Runtime tasks and the feed builder

pub mod core {
    //! Fundamental types, tags, events and error definitions.
    pub use fastfeed_core::*;
}

pub mod dictionary {
    //! Template catalog and field descriptors.
    pub use fastfeed_dictionary::*;
}

pub mod tagvalue {
    //! FIX tag=value messages.
    pub use fastfeed_tagvalue::*;
}

pub mod session {
    //! Session state machine, sequence tracking and recovery.
    pub use fastfeed_session::*;
}

pub mod transport {
    //! Frame codec and network setup.
    pub use fastfeed_transport::*;
}

pub mod fast {
    //! FAST decoding.
    pub use fastfeed_fast::*;
}

pub mod engine {
    //! Runtime tasks and the feed builder.
    pub use fastfeed_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fastfeed_core::{
        ConfigError, DecodeError, EntryType, MarketEvent, MsgType, SessionError, Symbol,
        TransportError, tags,
    };

    // Dictionary
    pub use fastfeed_dictionary::{FieldDescriptor, Operator, Template, TemplateCatalog, WireType};

    // Tag-value
    pub use fastfeed_tagvalue::FixMessage;

    // Session
    pub use fastfeed_session::{
        DisconnectReason, GapEvent, SessionAction, SessionConfig, SessionPhase,
        SessionStateMachine, SequenceTracker,
    };

    // Transport
    pub use fastfeed_transport::{FrameCodec, MulticastConfig};

    // FAST
    pub use fastfeed_fast::{
        DecodeOutcome, DecoderConfig, FastError, FieldDictionary, MessageDecoder,
    };

    // Engine
    pub use fastfeed_engine::{EngineError, FeedBuilder, FeedEvent, FeedHandler};
}

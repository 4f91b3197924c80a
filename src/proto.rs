//! Generated Envoy access-log service types.
//!
//! The module tree mirrors the protobuf package tree so that cross-package
//! references emitted by prost (`super::super::...`) resolve. Every package
//! also carries its pbjson `Serialize`/`Deserialize` impls, which implement
//! the proto3 JSON mapping. Well-known types come from `pbjson_types`.

#![allow(clippy::all, deprecated, missing_docs, missing_debug_implementations)]

/// Include the prost types of a package together with their JSON impls.
macro_rules! include_package {
    ($package:literal) => {
        tonic::include_proto!($package);
        include!(concat!(env!("OUT_DIR"), "/", $package, ".serde.rs"));
    };
}

pub mod envoy {
    pub mod api {
        pub mod v2 {
            pub mod core {
                include_package!("envoy.api.v2.core");
            }
        }
    }

    pub mod config {
        pub mod core {
            pub mod v3 {
                include_package!("envoy.config.core.v3");
            }
        }
    }

    pub mod data {
        pub mod accesslog {
            pub mod v2 {
                include_package!("envoy.data.accesslog.v2");
            }

            pub mod v3 {
                include_package!("envoy.data.accesslog.v3");
            }
        }
    }

    pub mod service {
        pub mod accesslog {
            pub mod v2 {
                include_package!("envoy.service.accesslog.v2");
            }

            pub mod v3 {
                include_package!("envoy.service.accesslog.v3");
            }
        }
    }

    pub mod r#type {
        include_package!("envoy.r#type");

        pub mod v3 {
            include_package!("envoy.r#type.v3");
        }
    }
}

pub mod xds {
    pub mod core {
        pub mod v3 {
            include_package!("xds.core.v3");
        }
    }
}

/// Short aliases for the two service generations.
pub use envoy::service::accesslog::v2 as als_v2;
pub use envoy::service::accesslog::v3 as als_v3;

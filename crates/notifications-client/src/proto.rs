//! Generated protobuf and gRPC types for the notifications service.

#![allow(clippy::all)]

tonic::include_proto!("notifications");

pub use notifications_service_client::NotificationsServiceClient;
pub use notifications_service_server::{NotificationsService, NotificationsServiceServer};

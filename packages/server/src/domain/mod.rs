//! ドメイン層
//!
//! 値オブジェクト・エンティティ・インメモリの調整用状態（接続表・ルーム表・
//! 入力中ロースター）と、Infrastructure 層が実装するインターフェース
//! （Repository / MessagePusher）を定義します。

pub mod entity;
pub mod error;
pub mod pusher;
pub mod registry;
pub mod repository;
pub mod room_table;
pub mod typing;
pub mod value_object;

pub use entity::{Message, MessageKind, TypingEntry, User};
pub use error::{MessagePushError, RepositoryError, ValidationError};
pub use pusher::{MessagePusher, PusherChannel};
pub use registry::{BoundUser, ConnectionRegistry};
pub use repository::{MessageRepository, NewMessage, UserRepository};
#[cfg(test)]
pub use repository::{MockMessageRepository, MockUserRepository};
pub use room_table::{RoomJoin, RoomTable};
pub use typing::TypingRoster;
pub use value_object::{
    ConnectionId, MessageContent, MessageId, RoomId, Timestamp, UserId, Username,
};

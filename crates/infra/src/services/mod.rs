mod push;

pub use push::{
    FcmPushGateway, GoogleServiceAccountAuthProvider, IAccessTokenProvider, IPushGateway,
    InMemoryPushGateway, PushError, PushMessage, PushReceipt, ServiceAccountKey,
};

pub mod consts {
    use http::header::HeaderValue;

    // <https://github.com/rust-lang/rust-clippy/issues/5812>
    #[allow(clippy::declare_interior_mutable_const)]
    pub const TEXT_PLAIN: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");
    pub const HUB_SIGNATURE_256: &str = "x-hub-signature-256";
}

mod collect_body;

pub use self::collect_body::{CollectBody, CollectError};

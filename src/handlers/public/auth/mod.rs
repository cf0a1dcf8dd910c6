mod login;

pub use login::login_post;

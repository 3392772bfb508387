use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};

fn main() {
    let token = rand::random::<[u8; 32]>();
    let encoded_token = STANDARD_NO_PAD.encode(token);
    println!("bearer-token (256 bit, Base-64 encoded): {encoded_token}");
}

// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `haiv keygen`: X25519 keypair for enrolling an agent.

use haiv_core::HaivError;
use haiv_crypto::keys;

pub fn run_keygen() -> Result<(), HaivError> {
    let (private, public) = keys::generate_x25519_keypair();
    println!("{}", render_keypair(&private, &public));
    Ok(())
}

pub fn render_keypair(private: &keys::StaticSecret, public: &keys::PublicKey) -> String {
    format!(
        "private key: {}\npublic key:  {}\n\nKeep the private key on this agent only; share the public key.",
        keys::private_key_to_hex(private).as_str(),
        keys::public_key_to_hex(public)
    )
}

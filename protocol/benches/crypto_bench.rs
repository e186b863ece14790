// Cryptographic primitive benchmarks for the BIP75 engine.
//
// Covers RSA-SHA256 signing and verification, ECDSA secp256k1 envelope
// signatures, and the hybrid ECDH + AES-256-CBC encryption at several
// payload sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bip75_protocol::crypto::keys::{ec_secret_key_from_pem, rsa_private_key_from_pem};
use bip75_protocol::crypto::{decrypt, ecdsa_sign, ecdsa_verify, encrypt, rsa_sign, rsa_verify};

const SENDER_KEY: &str = include_str!("../tests/fixtures/sender.key");
const SENDER_EC_KEY: &str = include_str!("../tests/fixtures/sender_ec.key");
const SENDER_EC_PUB: &str = include_str!("../tests/fixtures/sender_ec_pub.pem");
const RECIPIENT_EC_KEY: &str = include_str!("../tests/fixtures/recipient_ec.key");
const RECIPIENT_EC_PUB: &str = include_str!("../tests/fixtures/recipient_ec_pub.pem");

const DIGEST: &[u8] = b"9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

fn bench_rsa_sign(c: &mut Criterion) {
    let key = rsa_private_key_from_pem(SENDER_KEY).unwrap();

    c.bench_function("rsa/sign_digest", |b| {
        b.iter(|| rsa_sign(&key, DIGEST));
    });
}

fn bench_rsa_verify(c: &mut Criterion) {
    let key = rsa_private_key_from_pem(SENDER_KEY).unwrap();
    let public = key.to_public_key();
    let signature = rsa_sign(&key, DIGEST);

    c.bench_function("rsa/verify_digest", |b| {
        b.iter(|| rsa_verify(&public, DIGEST, &signature).unwrap());
    });
}

fn bench_ecdsa(c: &mut Criterion) {
    let secret = ec_secret_key_from_pem(SENDER_EC_KEY).unwrap();
    let public = secret.public_key();
    let signature = ecdsa_sign(&secret, DIGEST);

    c.bench_function("ecdsa/sign", |b| {
        b.iter(|| ecdsa_sign(&secret, DIGEST));
    });
    c.bench_function("ecdsa/verify", |b| {
        b.iter(|| ecdsa_verify(&public, DIGEST, &signature).unwrap());
    });
}

fn bench_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("hybrid/encrypt");

    for size in [256usize, 4 * 1024, 64 * 1024] {
        let plaintext = vec![0x5a; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &plaintext, |b, plaintext| {
            b.iter(|| encrypt(plaintext, RECIPIENT_EC_PUB, SENDER_EC_PUB, SENDER_EC_KEY).unwrap());
        });
    }

    group.finish();
}

fn bench_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("hybrid/decrypt");

    for size in [256usize, 4 * 1024, 64 * 1024] {
        let payload =
            encrypt(&vec![0x5a; size], RECIPIENT_EC_PUB, SENDER_EC_PUB, SENDER_EC_KEY).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| decrypt(payload, RECIPIENT_EC_KEY, SENDER_EC_PUB).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rsa_sign,
    bench_rsa_verify,
    bench_ecdsa,
    bench_encrypt,
    bench_decrypt,
);
criterion_main!(benches);

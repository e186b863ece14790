// Message pipeline benchmarks for the BIP75 engine.
//
// Measures creating, validating and parsing InvoiceRequests, plain and
// encrypted, plus trust-store path validation of a leaf certificate.

use std::path::Path;

use criterion::{criterion_group, criterion_main, Criterion};

use bip75_protocol::{
    AddressCurrency, Attestation, Bip75, EncryptionParameters, InvoiceRequestParameters,
    MessageInformation, MessageProcessor, Output, OwnerParameters, PkiDataParameters,
    RecipientParameters, SenderParameters,
};

const SENDER_CERT: &str = include_str!("../tests/fixtures/sender.pem");
const SENDER_KEY: &str = include_str!("../tests/fixtures/sender.key");
const ORIGINATOR_CERT: &str = include_str!("../tests/fixtures/originator.pem");
const ORIGINATOR_KEY: &str = include_str!("../tests/fixtures/originator.key");
const SENDER_EC_KEY: &str = include_str!("../tests/fixtures/sender_ec.key");
const SENDER_EC_PUB: &str = include_str!("../tests/fixtures/sender_ec_pub.pem");
const RECIPIENT_EC_KEY: &str = include_str!("../tests/fixtures/recipient_ec.key");
const RECIPIENT_EC_PUB: &str = include_str!("../tests/fixtures/recipient_ec_pub.pem");

fn bip75() -> Bip75 {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/trust_store");
    Bip75::from_trust_store(dir).unwrap()
}

fn params() -> InvoiceRequestParameters {
    InvoiceRequestParameters {
        amount: 50_000,
        memo: "bench invoice".to_string(),
        notification_url: "https://originator.example.com/notify".to_string(),
        originators: vec![OwnerParameters {
            primary_for_transaction: true,
            pki_data_parameters: vec![PkiDataParameters::x509(
                Attestation::NaturalPersonPrimaryName,
                ORIGINATOR_CERT,
                ORIGINATOR_KEY,
            )],
        }],
        beneficiaries: Vec::new(),
        originators_addresses: vec![Output::new(50_000, "bc1qbench", AddressCurrency::Bitcoin)],
        attestations_requested: vec![Attestation::NaturalPersonPrimaryName],
    }
}

fn sender() -> SenderParameters {
    SenderParameters {
        pki_data_parameters: Some(PkiDataParameters::x509(
            Attestation::LegalPersonPrimaryName,
            SENDER_CERT,
            SENDER_KEY,
        )),
        ev_certificate_pem: None,
        encryption_parameters: Some(EncryptionParameters::new(SENDER_EC_KEY, SENDER_EC_PUB)),
    }
}

fn recipient() -> RecipientParameters {
    RecipientParameters {
        encryption_parameters: Some(EncryptionParameters::new(RECIPIENT_EC_KEY, RECIPIENT_EC_PUB)),
        ..RecipientParameters::default()
    }
}

fn bench_create(c: &mut Criterion) {
    let bip75 = bip75();
    let processor = bip75.invoice_request();
    let (params, sender, recipient) = (params(), sender(), recipient());

    c.bench_function("invoice_request/create_plain", |b| {
        b.iter(|| {
            processor
                .create(&params, &sender, None, &MessageInformation::default())
                .unwrap()
        });
    });
    c.bench_function("invoice_request/create_encrypted", |b| {
        b.iter(|| {
            processor
                .create(&params, &sender, Some(&recipient), &MessageInformation::encrypted())
                .unwrap()
        });
    });
}

fn bench_validate(c: &mut Criterion) {
    let bip75 = bip75();
    let processor = bip75.invoice_request();
    let recipient = recipient();
    let plain = processor
        .create(&params(), &sender(), None, &MessageInformation::default())
        .unwrap();
    let encrypted = processor
        .create(&params(), &sender(), Some(&recipient), &MessageInformation::encrypted())
        .unwrap();

    c.bench_function("invoice_request/validate_plain", |b| {
        b.iter(|| processor.is_valid(&plain, None).unwrap());
    });
    c.bench_function("invoice_request/validate_encrypted", |b| {
        b.iter(|| processor.is_valid(&encrypted, Some(&recipient)).unwrap());
    });
    c.bench_function("invoice_request/parse_plain", |b| {
        b.iter(|| processor.parse(&plain, None).unwrap());
    });
}

fn bench_certificate_path(c: &mut Criterion) {
    let bip75 = bip75();
    let validator = bip75.validator();

    c.bench_function("pki/validate_leaf", |b| {
        b.iter(|| validator.validate(SENDER_CERT).unwrap());
    });
}

criterion_group!(benches, bench_create, bench_validate, bench_certificate_path);
criterion_main!(benches);

//! End-to-end tests of the mint pipeline against an in-memory ledger:
//! rent query -> derive -> build -> sign -> submit -> inspect the wire bytes.

use std::sync::Mutex;

use async_trait::async_trait;
use ed25519_dalek::{Signature, VerifyingKey};
use nft_mint::programs::{TOKEN_METADATA_PROGRAM_ID, TOKEN_PROGRAM_ID};
use nft_mint::*;

const URI: &str = "https://arweave.net/FPGAv1XnyZidnqquOdEbSY6_ES735ckcDTdaAtI7GFw";
const RECIPIENT: &str = "AVdBTNhDqYgXGaaVkqiaUJ1Yqa61hMiFFaVRtqwzs5GZ";
const RENT: u64 = 1_461_600;
const BLOCKHASH: [u8; 32] = [0xB1; 32];

#[derive(Default)]
struct MemoryLedger {
    fail_rent: bool,
    reject_send: bool,
    calls: Mutex<Vec<&'static str>>,
    submitted: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn get_minimum_balance_for_rent_exemption(&self, size: u64) -> Result<u64, MintError> {
        self.calls.lock().unwrap().push("rent");
        assert_eq!(size, 82);
        if self.fail_rent {
            return Err(MintError::Network("connection reset".into()));
        }
        Ok(RENT)
    }

    async fn get_latest_blockhash(&self) -> Result<[u8; 32], MintError> {
        self.calls.lock().unwrap().push("blockhash");
        Ok(BLOCKHASH)
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, MintError> {
        self.calls.lock().unwrap().push("send");
        if self.reject_send {
            return Err(MintError::LedgerRejection(
                "Transaction simulation failed: custom program error: 0x0".into(),
            ));
        }
        self.submitted.lock().unwrap().push(wire.to_vec());
        let sig: [u8; 64] = wire[1..65].try_into().unwrap();
        Ok(bs58::encode(sig).into_string())
    }
}

fn request(creator: &Keypair) -> MintRequest {
    MintRequest::new(Data {
        symbol: "SYMBOL".into(),
        name: "My NFT".into(),
        uri: URI.into(),
        seller_fee_basis_points: 100,
        creators: Some(vec![Creator {
            address: creator.pubkey(),
            share: 100,
            verified: true,
        }]),
    })
}

/// Minimal legacy-message parser for assertions.
struct ParsedTx {
    signatures: Vec<[u8; 64]>,
    message: Vec<u8>,
    num_required: u8,
    account_keys: Vec<[u8; 32]>,
    blockhash: [u8; 32],
    instructions: Vec<(u8, Vec<u8>, Vec<u8>)>,
}

fn parse(wire: &[u8]) -> ParsedTx {
    let (num_sigs, mut at) = decode_compact_u16(wire).unwrap();
    let signatures: Vec<[u8; 64]> = (0..num_sigs as usize)
        .map(|i| wire[at + i * 64..at + (i + 1) * 64].try_into().unwrap())
        .collect();
    at += num_sigs as usize * 64;
    let message = wire[at..].to_vec();

    let msg = &message;
    let num_required = msg[0];
    let mut p = 3;
    let (n_keys, used) = decode_compact_u16(&msg[p..]).unwrap();
    p += used;
    let account_keys: Vec<[u8; 32]> = (0..n_keys as usize)
        .map(|i| msg[p + i * 32..p + (i + 1) * 32].try_into().unwrap())
        .collect();
    p += n_keys as usize * 32;
    let blockhash: [u8; 32] = msg[p..p + 32].try_into().unwrap();
    p += 32;

    let (n_ix, used) = decode_compact_u16(&msg[p..]).unwrap();
    p += used;
    let mut instructions = Vec::new();
    for _ in 0..n_ix {
        let program = msg[p];
        p += 1;
        let (n, used) = decode_compact_u16(&msg[p..]).unwrap();
        p += used;
        let accounts = msg[p..p + n as usize].to_vec();
        p += n as usize;
        let (len, used) = decode_compact_u16(&msg[p..]).unwrap();
        p += used;
        let data = msg[p..p + len as usize].to_vec();
        p += len as usize;
        instructions.push((program, accounts, data));
    }
    assert_eq!(p, msg.len());

    ParsedTx {
        signatures,
        message,
        num_required,
        account_keys,
        blockhash,
        instructions,
    }
}

#[tokio::test]
async fn mint_produces_two_signer_six_instruction_transaction() {
    let ledger = MemoryLedger::default();
    let creator = Keypair::generate();
    let mint = Keypair::generate();
    let recipient = address_to_bytes(RECIPIENT).unwrap();

    let outcome = mint_nft_with_mint_key(
        &ledger,
        &creator,
        &mint,
        &recipient,
        request(&creator),
        &ProgramIds::default(),
    )
    .await
    .unwrap();

    assert_eq!(*ledger.calls.lock().unwrap(), vec!["rent", "blockhash", "send"]);
    let wire = ledger.submitted.lock().unwrap()[0].clone();
    let tx = parse(&wire);

    // Exactly two signers: the creator (fee payer, first) and the new mint.
    assert_eq!(tx.num_required, 2);
    assert_eq!(tx.signatures.len(), 2);
    assert_eq!(tx.account_keys[0], creator.pubkey());
    assert_eq!(tx.account_keys[1], mint.pubkey());
    for (sig, key) in tx.signatures.iter().zip(&tx.account_keys) {
        let vk = VerifyingKey::from_bytes(key).unwrap();
        assert!(vk
            .verify_strict(&tx.message, &Signature::from_bytes(sig))
            .is_ok());
    }

    assert_eq!(tx.blockhash, BLOCKHASH);
    assert_eq!(tx.instructions.len(), 6);

    let program_of = |i: usize| tx.account_keys[tx.instructions[i].0 as usize];
    assert_eq!(program_of(4), TOKEN_METADATA_PROGRAM_ID);
    assert_eq!(program_of(5), TOKEN_METADATA_PROGRAM_ID);
    assert_eq!(program_of(3), TOKEN_PROGRAM_ID);

    // CreateMetadataAccount tag, then CreateMasterEdition with max supply 0.
    assert_eq!(tx.instructions[4].2[0], 0);
    assert_eq!(tx.instructions[5].2, vec![10, 1, 0, 0, 0, 0, 0, 0, 0, 0]);

    // Rent made it into CreateAccount.
    assert_eq!(&tx.instructions[0].2[4..12], &RENT.to_le_bytes());

    let (metadata, _) = metadata_address(&mint.pubkey(), &TOKEN_METADATA_PROGRAM_ID).unwrap();
    let (edition, _) = master_edition_address(&mint.pubkey(), &TOKEN_METADATA_PROGRAM_ID).unwrap();
    assert_eq!(outcome.metadata, metadata);
    assert_eq!(outcome.master_edition, edition);
    assert_eq!(outcome.mint, mint.pubkey());
    assert_eq!(
        outcome.signature,
        bs58::encode(tx.signatures[0]).into_string()
    );
}

#[tokio::test]
async fn each_request_uses_a_fresh_mint() {
    let ledger = MemoryLedger::default();
    let creator = Keypair::generate();
    let recipient = [0xEE; 32];
    let programs = ProgramIds::default();

    let a = mint_nft(&ledger, &creator, &recipient, request(&creator), &programs)
        .await
        .unwrap();
    let b = mint_nft(&ledger, &creator, &recipient, request(&creator), &programs)
        .await
        .unwrap();

    assert_ne!(a.mint, b.mint);
    assert_ne!(a.metadata, b.metadata);
    assert_ne!(a.associated_account, b.associated_account);
}

#[tokio::test]
async fn invalid_shares_fail_before_any_network_call() {
    let ledger = MemoryLedger::default();
    let creator = Keypair::generate();
    let mut req = request(&creator);
    req.data.creators = Some(vec![Creator {
        address: creator.pubkey(),
        share: 90,
        verified: true,
    }]);

    let err = mint_nft(&ledger, &creator, &[0xEE; 32], req, &ProgramIds::default())
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::Encoding(_)));
    assert!(ledger.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn creator_key_cannot_double_as_mint() {
    let ledger = MemoryLedger::default();
    let creator = Keypair::generate();

    let err = mint_nft_with_mint_key(
        &ledger,
        &creator,
        &creator,
        &[0xEE; 32],
        request(&creator),
        &ProgramIds::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MintError::InvalidKey(_)));
    assert!(err.is_local());
    assert!(ledger.calls.lock().unwrap().is_empty());
    assert!(ledger.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn network_failure_aborts_without_submission() {
    let ledger = MemoryLedger {
        fail_rent: true,
        ..Default::default()
    };
    let creator = Keypair::generate();

    let err = mint_nft(
        &ledger,
        &creator,
        &[0xEE; 32],
        request(&creator),
        &ProgramIds::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MintError::Network(_)));
    assert_eq!(*ledger.calls.lock().unwrap(), vec!["rent"]);
    assert!(ledger.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn ledger_rejection_is_surfaced() {
    let ledger = MemoryLedger {
        reject_send: true,
        ..Default::default()
    };
    let creator = Keypair::generate();

    let err = mint_nft(
        &ledger,
        &creator,
        &[0xEE; 32],
        request(&creator),
        &ProgramIds::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MintError::LedgerRejection(_)));
    assert!(!err.is_local());
}

#[tokio::test]
async fn unlimited_supply_encodes_absent_flag() {
    let ledger = MemoryLedger::default();
    let creator = Keypair::generate();
    let mut req = request(&creator);
    req.max_supply = MaxSupply::Unlimited;

    mint_nft(&ledger, &creator, &[0xEE; 32], req, &ProgramIds::default())
        .await
        .unwrap();

    let wire = ledger.submitted.lock().unwrap()[0].clone();
    let tx = parse(&wire);
    assert_eq!(tx.instructions[5].2, vec![10, 0]);
}

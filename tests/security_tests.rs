mod common;

use common::{channel_pair, init_tracing, TamperingChannel};
use schnorr_zkp::{
    is_probable_prime, is_strong_probable_prime, ByteChannel, Challenge, Commitment,
    ProtocolParameters, Prover, ProverSecret, PublicCommitment, Response, RoundBudget,
    SessionOutcome, SessionRng, Verifier,
};

fn worked_example() -> ProtocolParameters {
    ProtocolParameters::new(5, 23).expect("valid parameters")
}

#[tokio::test]
async fn tampered_response_is_rejected_in_that_round() {
    init_tracing();

    for tampered_round in [0u32, 3, 9] {
        let (prover_channel, mut verifier_channel) = channel_pair();
        let mut prover_channel =
            TamperingChannel::response_of_round(prover_channel, tampered_round as usize);
        let mut prover = Prover::with_secret(SessionRng::from_seed(11), ProverSecret::new(6));
        let mut verifier =
            Verifier::new(SessionRng::from_seed(12), RoundBudget::Fixed(10)).unwrap();

        let (proved, verified) = tokio::join!(
            prover.run(&mut prover_channel),
            verifier.run_with_parameters(&mut verifier_channel, worked_example()),
        );

        assert_eq!(
            verified.unwrap(),
            SessionOutcome::RejectedAt {
                round: tampered_round
            }
        );
        assert_eq!(
            proved.unwrap(),
            SessionOutcome::RejectedAt {
                round: tampered_round
            }
        );
    }
}

#[test]
fn forged_secret_is_caught_on_blinded_challenge() {
    let params = worked_example();
    let honest = Prover::with_secret(SessionRng::from_seed(1), ProverSecret::new(6));
    let y = honest.public_commitment(&params);

    let mut forger = Prover::with_secret(SessionRng::from_seed(2), ProverSecret::new(7));
    let (commitment, nonce) = forger.commit(&params);

    let response = forger.respond(&params, &nonce, Challenge::RevealNonce);
    assert!(Verifier::<SessionRng>::verify_round(
        &params,
        &y,
        &commitment,
        Challenge::RevealNonce,
        &response
    ));

    let response = forger.respond(&params, &nonce, Challenge::RevealBlindedSecret);
    assert!(!Verifier::<SessionRng>::verify_round(
        &params,
        &y,
        &commitment,
        Challenge::RevealBlindedSecret,
        &response
    ));
}

#[tokio::test]
async fn negative_response_rejects_the_round() {
    let (mut prover_side, mut verifier_channel) = channel_pair();
    let mut verifier = Verifier::new(SessionRng::from_seed(13), RoundBudget::Fixed(3)).unwrap();

    let cheater = async {
        let mut setup = [0u8; 16];
        prover_side.read_fixed(&mut setup).await.unwrap();
        prover_side.write_i64(8).await.unwrap();
        let rounds = prover_side.read_i32().await.unwrap();
        prover_side.write_i64(19).await.unwrap();
        let _challenge = prover_side.read_bool().await.unwrap();
        prover_side.write_i64(-15).await.unwrap();
        let accepted = prover_side.read_bool().await.unwrap();
        (rounds, accepted)
    };

    let (verified, (rounds, accepted)) = tokio::join!(
        verifier.run_with_parameters(&mut verifier_channel, worked_example()),
        cheater,
    );

    assert_eq!(rounds, 3);
    assert!(!accepted);
    assert_eq!(verified.unwrap(), SessionOutcome::RejectedAt { round: 0 });
}

#[test]
fn raw_response_comparison_would_reject_honest_provers() {
    // g = 5, p = 23, x = 6, r = 15: the blinded response is 21 while
    // C * y mod p is 14. Only g^response matches C * y.
    let params = worked_example();
    let commitment = params.pow(15);
    let y = params.pow(6);
    let response = (6 + 15) % params.exponent_modulus();

    assert_eq!((commitment, y, response), (19, 8, 21));
    assert_ne!(params.mul(commitment, y), response);
    assert_eq!(params.mul(commitment, y), params.pow(response));
}

#[test]
fn degenerate_generators_are_not_refused() {
    // Generators are not checked to be primitive roots. With g = 1 every
    // commitment is 1 and any response verifies: a known weakness.
    for generator in [0, 1, 23, 24] {
        assert!(ProtocolParameters::new(generator, 23).is_ok());
    }

    let params = ProtocolParameters::new(1, 23).unwrap();
    let y = PublicCommitment::new(1);
    let commitment = Commitment::new(1);
    for guess in [0, 5, 17] {
        assert!(Verifier::<SessionRng>::verify_round(
            &params,
            &y,
            &commitment,
            Challenge::RevealBlindedSecret,
            &Response::new(guess)
        ));
    }
}

#[test]
fn carmichael_numbers_are_rejected_with_enough_rounds() {
    let mut rng = SessionRng::from_seed(21);
    for carmichael in [561u64, 1105, 1729, 2465, 2821, 6601, 8911] {
        assert!(!is_probable_prime(carmichael, 64, &mut rng), "{carmichael}");
    }
}

#[test]
fn strong_liars_exist() {
    // Miller-Rabin admits false positives: 2047 = 23 * 89 passes base 2,
    // so a single unlucky witness declares it prime.
    assert!(is_strong_probable_prime(2047, 2));
    assert!(!is_strong_probable_prime(561, 2));
}

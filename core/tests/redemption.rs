//! Redemption transaction fixed-vector tests.

mod common;

use bergamot_core::actor::Actor;
use bergamot_core::builder::transaction::{
    create_redemption_transaction, RedemptionRequest, TxError,
};
use bergamot_core::Network;
use common::{txid, utxo_with_raw};
use hex_literal::hex;

const WALLET_PRIVATE_KEY: [u8; 32] =
    hex!("7c246a5d2fcf476fd6f805cb8174b1cf441b13ea414e5560ca2bdc963aeb7d0c");

fn wallet() -> Actor {
    Actor::from_slice(&WALLET_PRIVATE_KEY).expect("valid wallet key")
}

#[test]
fn redeems_to_p2pkh_address() {
    // https://live.blockcypher.com/btc-testnet/tx/67f19c3c33a0735f64786afdf3627a9ae8b17af3fc691759abb5a88a9472c234/
    let main_utxo = utxo_with_raw(
        "09f894a403a7ddc2efdfded2eac41c80438ee3e254e8d6c17a6618b156f7b231",
        1,
        1552680,
        "01000000000101f8a28c903ec78f15c9202f186acd8645e5139b6cd2c39f75ba97ecf5b705e9f10100000000ffffffff02d0200000000000001600144130879211c54df460e484ddf9aac009cb38ee7428b11700000000001600148db50eb52063ea9d98b3eac91489a90f738986f602473044022024d6aa19ce62444f3ace7b5194ee481d2accf4452adbf76c1d2b060767a0dbee0220452df45ac5e28f10cc8a42df347d900db0e256b5828e8d98c862365138fef95c012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d900000000",
    );

    let requests = vec![RedemptionRequest {
        address: "mmTeMR8RKu6QzMGTG4ipA71uewm3EuJng5".to_string(),
        amount: 10000,
        fee_share: 1600,
        treasury_fee: 0,
    }];

    let outcome =
        create_redemption_transaction(&wallet(), &main_utxo, &requests, Network::Testnet, true)
            .expect("redemption assembles");

    assert_eq!(
        outcome.raw_transaction.to_hex(),
        "0100000000010131b2f756b118667ac1d6e854e2e38e43801cc4ead2dedfefc2dda703a494f8090100000000ffffffff02d0200000000000001976a9144130879211c54df460e484ddf9aac009cb38ee7488ac188a1700000000001600148db50eb52063ea9d98b3eac91489a90f738986f602483045022100ce19036320ae26386711645fa895ce88aaf9f52fa7fcab69219042dc8634625202205a60a2d1eed4440c86b6b28c517fbca526ebf631298af044f3f3b2e477dee81f012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d900000000"
    );
    assert_eq!(
        outcome.transaction_hash,
        txid("67f19c3c33a0735f64786afdf3627a9ae8b17af3fc691759abb5a88a9472c234")
    );

    // Change returns to the wallet as the new main UTXO.
    let new_main_utxo = outcome.new_main_utxo.expect("change output exists");
    assert_eq!(new_main_utxo.output_index, 1);
    assert_eq!(new_main_utxo.value, 1552680 - 10000);
}

#[test]
fn redeems_to_p2wpkh_address() {
    // https://live.blockcypher.com/btc-testnet/tx/580e38c17668463257c7602cdd92baa7488fc5aac6701e0b4724e6039704c0b2/
    let main_utxo = utxo_with_raw(
        "67f19c3c33a0735f64786afdf3627a9ae8b17af3fc691759abb5a88a9472c234",
        1,
        1542680,
        "0100000000010131b2f756b118667ac1d6e854e2e38e43801cc4ead2dedfefc2dda703a494f8090100000000ffffffff02d0200000000000001976a9144130879211c54df460e484ddf9aac009cb38ee7488ac188a1700000000001600148db50eb52063ea9d98b3eac91489a90f738986f602483045022100ce19036320ae26386711645fa895ce88aaf9f52fa7fcab69219042dc8634625202205a60a2d1eed4440c86b6b28c517fbca526ebf631298af044f3f3b2e477dee81f012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d900000000",
    );

    let requests = vec![RedemptionRequest {
        address: "tb1qgycg0ys3c4xlgc8ysnwln2kqp89n3mn5ts7z3l".to_string(),
        amount: 15000,
        fee_share: 1700,
        treasury_fee: 0,
    }];

    let outcome =
        create_redemption_transaction(&wallet(), &main_utxo, &requests, Network::Testnet, true)
            .expect("redemption assembles");

    assert_eq!(
        outcome.raw_transaction.to_hex(),
        "0100000000010134c272948aa8b5ab591769fcf37ab1e89a7a62f3fd6a78645f73a0333c9cf1670100000000ffffffff02f4330000000000001600144130879211c54df460e484ddf9aac009cb38ee74804f1700000000001600148db50eb52063ea9d98b3eac91489a90f738986f602483045022100c5599fd5e8d0657f101d1fdaceee326f4a0c3e4995d38df6de2dbcc682a7c71a022079704a8560551c462858e4d95caf539c6a885334dead518355bb84e5e949192c012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d900000000"
    );
    assert_eq!(
        outcome.transaction_hash,
        txid("580e38c17668463257c7602cdd92baa7488fc5aac6701e0b4724e6039704c0b2")
    );
}

#[test]
fn refuses_empty_request_list() {
    let main_utxo = utxo_with_raw(
        "09f894a403a7ddc2efdfded2eac41c80438ee3e254e8d6c17a6618b156f7b231",
        1,
        1552680,
        "01000000000101f8a28c903ec78f15c9202f186acd8645e5139b6cd2c39f75ba97ecf5b705e9f10100000000ffffffff02d0200000000000001600144130879211c54df460e484ddf9aac009cb38ee7428b11700000000001600148db50eb52063ea9d98b3eac91489a90f738986f602473044022024d6aa19ce62444f3ace7b5194ee481d2accf4452adbf76c1d2b060767a0dbee0220452df45ac5e28f10cc8a42df347d900db0e256b5828e8d98c862365138fef95c012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d900000000",
    );

    let result =
        create_redemption_transaction(&wallet(), &main_utxo, &[], Network::Testnet, true);
    assert!(matches!(result, Err(TxError::NoRedemptionRequests)));
}

#[test]
fn refuses_fees_exceeding_requested_amount() {
    let main_utxo = utxo_with_raw(
        "09f894a403a7ddc2efdfded2eac41c80438ee3e254e8d6c17a6618b156f7b231",
        1,
        1552680,
        "01000000000101f8a28c903ec78f15c9202f186acd8645e5139b6cd2c39f75ba97ecf5b705e9f10100000000ffffffff02d0200000000000001600144130879211c54df460e484ddf9aac009cb38ee7428b11700000000001600148db50eb52063ea9d98b3eac91489a90f738986f602473044022024d6aa19ce62444f3ace7b5194ee481d2accf4452adbf76c1d2b060767a0dbee0220452df45ac5e28f10cc8a42df347d900db0e256b5828e8d98c862365138fef95c012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d900000000",
    );

    let requests = vec![RedemptionRequest {
        address: "mmTeMR8RKu6QzMGTG4ipA71uewm3EuJng5".to_string(),
        amount: 1000,
        fee_share: 900,
        treasury_fee: 200,
    }];

    let result =
        create_redemption_transaction(&wallet(), &main_utxo, &requests, Network::Testnet, true);
    assert!(matches!(result, Err(TxError::FeesExceedAmount)));
}

// Diesel table definitions matching migrations/.

diesel::table! {
    counters (name) {
        name -> Text,
        value -> BigInt,
    }
}

diesel::table! {
    products (id) {
        id -> BigInt,
        name -> Text,
        category -> Text,
        price -> Text,
        stock -> BigInt,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    applied_stock_tokens (token) {
        token -> Text,
        applied_at -> Text,
    }
}

diesel::table! {
    orders (id) {
        id -> BigInt,
        user_id -> BigInt,
        items -> Text,
        total_amount -> Text,
        status -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    event_records (topic, partition_no, record_offset) {
        topic -> Text,
        partition_no -> Integer,
        record_offset -> BigInt,
        record_key -> Text,
        payload -> Binary,
        appended_at -> Text,
    }
}

diesel::table! {
    consumer_offsets (group_id, topic, partition_no) {
        group_id -> Text,
        topic -> Text,
        partition_no -> Integer,
        next_offset -> BigInt,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    counters,
    products,
    applied_stock_tokens,
    orders,
    event_records,
    consumer_offsets,
);

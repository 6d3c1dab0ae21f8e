//! Function-ID to name tables for every traced layer.
//!
//! The traced libraries tag each tracepoint with a numeric `apiFunctionID`.
//! SE and ECDSA codes overlap (both start at 0x0101), so a code only has
//! meaning together with the table of the layer that emitted it.

/// Fixed mapping from function code to function name, sorted by code
#[derive(Debug, Clone, Copy)]
pub struct FunctionTable {
    entries: &'static [(u32, &'static str)],
}

impl FunctionTable {
    pub const fn new(entries: &'static [(u32, &'static str)]) -> Self {
        Self { entries }
    }

    /// Name for `id`, if the code is known
    pub fn name(&self, id: u32) -> Option<&'static str> {
        self.entries
            .binary_search_by_key(&id, |(code, _)| *code)
            .ok()
            .map(|index| self.entries[index].1)
    }

    /// Name for `id`, or a hex placeholder for codes missing from the table
    pub fn display_name(&self, id: u32) -> String {
        match self.name(id) {
            Some(name) => name.to_string(),
            None => format!("unknown_0x{:04X}", id),
        }
    }

    /// All known codes in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|(code, _)| *code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Secure element API functions (`v2xsehsm:apiEntry`/`apiExit`)
pub const SE_FUNCTIONS: FunctionTable = FunctionTable::new(&[
    (0x0101, "v2xSe_connect"),
    (0x0102, "v2xSe_activate"),
    (0x0103, "v2xSe_activateWithSecurityLevel"),
    (0x0104, "v2xSe_reset"),
    (0x0105, "v2xSe_deactivate"),
    (0x0106, "v2xSe_disconnect"),
    (0x0107, "v2xSe_generateMaEccKeyPair"),
    (0x0108, "v2xSe_getMaEccPublicKey"),
    (0x0109, "v2xSe_createMaSign"),
    (0x010A, "v2xSe_generateRtEccKeyPair"),
    (0x010B, "v2xSe_deleteRtEccPrivateKey"),
    (0x010C, "v2xSe_getRtEccPublicKey"),
    (0x010D, "v2xSe_createRtSignLowLatency"),
    (0x010E, "v2xSe_createRtSign"),
    (0x010F, "v2xSe_generateBaEccKeyPair"),
    (0x0110, "v2xSe_deleteBaEccPrivateKey"),
    (0x0111, "v2xSe_getBaEccPublicKey"),
    (0x0112, "v2xSe_createBaSign"),
    (0x0113, "v2xSe_deriveRtEccKeyPair"),
    (0x0114, "v2xSe_activateRtKeyForSigning"),
    (0x0115, "v2xSe_getAppletVersion"),
    (0x0116, "v2xSe_getRandomNumber"),
    (0x0117, "v2xSe_getSeInfo"),
    (0x0118, "v2xSe_getCryptoLibVersion"),
    (0x0119, "v2xSe_getPlatformInfo"),
    (0x011A, "v2xSe_getPlatformConfig"),
    (0x011B, "v2xSe_getChipInfo"),
    (0x011C, "v2xSe_getAttackLog"),
    (0x011D, "v2xSe_encryptUsingEcies"),
    (0x011E, "v2xSe_decryptUsingRtEcies"),
    (0x011F, "v2xSe_decryptUsingMaEcies"),
    (0x0120, "v2xSe_decryptUsingBaEcies"),
    (0x0121, "v2xSe_getKeyLenFromCurveID"),
    (0x0122, "v2xSe_getSigLenFromHashLen"),
    (0x0123, "v2xSe_sendReceive"),
    (0x0124, "v2xSe_storeData"),
    (0x0125, "v2xSe_getData"),
    (0x0126, "v2xSe_deleteData"),
    (0x0127, "v2xSe_invokeGarbageCollector"),
    (0x0128, "v2xSe_getRemainingNvm"),
    (0x0129, "v2xSe_endKeyInjection"),
    (0x012A, "v2xSe_getSePhase"),
    (0x012B, "v2xSe_getKekPublicKey"),
    (0x012C, "v2xSe_injectMaEccPrivateKey"),
    (0x012D, "v2xSe_injectRtEccPrivateKey"),
    (0x012E, "v2xSe_injectBaEccPrivateKey"),
    (0x012F, "v2xSe_generateRtSymmetricKey"),
    (0x0130, "v2xSe_deleteRtSymmetricKey"),
    (0x0131, "v2xSe_encryptUsingRtCipher"),
    (0x0132, "v2xSe_decryptUsingRtCipher"),
    (0x0133, "v2xSe_encryptUsingSm2Eces"),
    (0x0134, "v2xSe_decryptUsingRtSm2Eces"),
    (0x0135, "v2xSe_decryptUsingMaSm2Eces"),
    (0x0136, "v2xSe_decryptUsingBaSm2Eces"),
    (0x0137, "v2xSe_sm2_get_z"),
]);

/// ECDSA library functions (`ecdsa:apiEntry`/`apiExit`)
pub const ECDSA_FUNCTIONS: FunctionTable = FunctionTable::new(&[
    (0x0101, "ecdsa_open"),
    (0x0102, "ecdsa_close"),
    (0x0103, "ecdsa_get_version"),
    (0x0104, "ecdsa_verify_signature"),
    (0x0105, "ecdsa_verify_signature_of_message"),
    (0x0106, "ecdsa_decompress_public_key"),
    (0x0107, "ecdsa_reconstruct_public_key"),
    (0x0108, "ecdsa_sha256"),
    (0x0109, "ecdsa_sha384"),
    (0x010A, "ecdsa_sha512"),
    (0x010B, "ecdsa_sm3"),
]);

/// HSM calls made from either layer (`hsmCall`/`hsmReturn`)
pub const HSM_FUNCTIONS: FunctionTable = FunctionTable::new(&[
    (0x0201, "hsm_open_session"),
    (0x0202, "hsm_close_session"),
    (0x0203, "hsm_open_key_store_service"),
    (0x0204, "hsm_close_key_store_service"),
    (0x0205, "hsm_generate_key"),
    (0x0206, "hsm_manage_key"),
    (0x0207, "hsm_manage_key_group"),
    (0x0208, "hsm_open_key_management_service"),
    (0x0209, "hsm_butterfly_key_expansion"),
    (0x020A, "hsm_close_key_management_service"),
    (0x020B, "hsm_open_cipher_service"),
    (0x020C, "hsm_cipher_one_go"),
    (0x020D, "hsm_ecies_decryption"),
    (0x020E, "hsm_open_signature_generation_service"),
    (0x020F, "hsm_close_cipher_service"),
    (0x0210, "hsm_generate_signature"),
    (0x0211, "hsm_prepare_signature"),
    (0x0212, "hsm_open_signature_verification_service"),
    (0x0213, "hsm_verify_signature"),
    (0x0214, "hsm_import_public_key"),
    (0x0215, "hsm_close_signature_verification_service"),
    (0x0216, "hsm_open_rng_service"),
    (0x0217, "hsm_close_rng_service"),
    (0x0218, "hsm_get_random"),
    (0x0219, "hsm_open_hash_service"),
    (0x021A, "hsm_close_hash_service"),
    (0x021B, "hsm_hash_one_go"),
    (0x021C, "hsm_pub_key_reconstruction"),
    (0x021D, "hsm_pub_key_decompression"),
    (0x021E, "hsm_close_signature_generation_service"),
    (0x021F, "hsm_ecies_encryption"),
    (0x0220, "hsm_pub_key_recovery"),
    (0x0221, "hsm_export_root_key_encryption_key"),
    (0x0222, "hsm_open_sm2_eces_service"),
    (0x0223, "hsm_close_sm2_eces_service"),
    (0x0224, "hsm_sm2_eces_encryption"),
    (0x0225, "hsm_sm2_eces_decryption"),
]);

/// System calls made from the SE layer (`systemCall`/`systemReturn`)
pub const SYSTEM_FUNCTIONS: FunctionTable = FunctionTable::new(&[
    (0x0301, "open"),
    (0x0302, "read"),
    (0x0303, "write"),
    (0x0304, "close"),
    (0x0305, "fstat"),
    (0x0306, "remove"),
    (0x0307, "opendir"),
    (0x0308, "readdir"),
    (0x0309, "closedir"),
    (0x030A, "mkdir"),
]);

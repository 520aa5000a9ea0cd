//! Diesel table declarations for the replicated target tables.
//!
//! `id` is the upsert conflict key everywhere. Timestamps are stored as
//! canonical `YYYY-MM-DD HH:MM:SS` text. Table creation itself is owned
//! by the deployment's DDL, not by this crate.

diesel::table! {
    clientes (id) {
        id -> Text,
        no_cliente -> Nullable<BigInt>,
        razon_social -> Nullable<Text>,
        rfc -> Nullable<Text>,
        e_mail -> Nullable<Text>,
        nivel_precio -> Nullable<BigInt>,
        telefonos -> Nullable<Text>,
        notas -> Nullable<Text>,
        notas_pago -> Nullable<Text>,
        atencion -> Nullable<Text>,
        limite_credito -> Nullable<Double>,
        dias_credito -> Nullable<BigInt>,
        fec_crea -> Nullable<Text>,
        usr_crea -> Nullable<Text>,
        fec_modif -> Nullable<Text>,
        usr_modif -> Nullable<Text>,
        siglas -> Nullable<Text>,
        no_emp_vendedor -> Nullable<BigInt>,
        regimen_fiscal -> Nullable<Text>,
        cp -> Nullable<Text>,
        direccion -> Nullable<Text>,
        e_mail_compras -> Nullable<Text>,
        cve_uso_cfdi -> Nullable<Text>,
    }
}

diesel::table! {
    proyectos_cliente (id) {
        id -> Text,
        no_cliente -> Nullable<BigInt>,
        no_proyecto -> Nullable<BigInt>,
        nom_proyecto -> Nullable<Text>,
        num_proy_cliente -> Nullable<Text>,
        txt_proy_cliente -> Nullable<Text>,
        importe_anticipo -> Nullable<Double>,
        pct_anticipo -> Nullable<Double>,
        fec_crea -> Nullable<Text>,
        usr_crea -> Nullable<Text>,
        fec_modif -> Nullable<Text>,
        usr_modif -> Nullable<Text>,
        id_skyplanner -> Nullable<Text>,
    }
}

diesel::table! {
    v_insumos (id) {
        id -> Text,
        no_insumo -> Nullable<BigInt>,
        clave_estandar -> Nullable<Text>,
        descripcion -> Nullable<Text>,
        nom_largo -> Nullable<Text>,
        tipo_insumo -> Nullable<Text>,
        cve_linea -> Nullable<Text>,
        cve_generica -> Nullable<Text>,
        cve_tipo_vidrio -> Nullable<Text>,
        no_espesor -> Nullable<BigInt>,
        no_medida -> Nullable<BigInt>,
        no_acabado -> Nullable<BigInt>,
        no_longitud -> Nullable<BigInt>,
        cve_unidad -> Nullable<Text>,
        precio_mxn -> Nullable<Double>,
        precio_usd -> Nullable<Double>,
        precio_eur -> Nullable<Double>,
        costo_promedio -> Nullable<Double>,
        no_insumo_gsns -> Nullable<BigInt>,
        espesor -> Nullable<Double>,
        vigente -> Nullable<Text>,
        id_skyplanner -> Nullable<Text>,
        tiempo_pre_proceso -> Nullable<Double>,
        tiempo_proceso -> Nullable<Double>,
        tiempo_post_proceso -> Nullable<Double>,
    }
}

diesel::table! {
    cotizaciones (id) {
        id -> Text,
        no_cotizacion -> Nullable<BigInt>,
        no_contacto -> Nullable<BigInt>,
        fecha -> Nullable<Text>,
        no_cliente -> Nullable<BigInt>,
        status -> Nullable<Text>,
        no_proyecto -> Nullable<BigInt>,
        comentarios -> Nullable<Text>,
        solo_maquila -> Nullable<Text>,
        pct_descuento -> Nullable<Double>,
        no_emp_vendedor -> Nullable<BigInt>,
        fec_valorizacion -> Nullable<Text>,
        comprobante -> Nullable<Text>,
        fec_crea -> Nullable<Text>,
        usr_crea -> Nullable<Text>,
        fec_modif -> Nullable<Text>,
        usr_modif -> Nullable<Text>,
        moneda -> Nullable<Text>,
        referencia -> Nullable<Text>,
        no_orden_compra -> Nullable<Text>,
    }
}

diesel::table! {
    detalle_cotizacion (id) {
        id -> Text,
        no_cotizacion -> Nullable<BigInt>,
        dec_seq -> Nullable<BigInt>,
        renglon -> Nullable<BigInt>,
        clase_insumo -> Nullable<Text>,
        no_insumo -> Nullable<BigInt>,
        base -> Nullable<Double>,
        altura -> Nullable<Double>,
        cantidad -> Nullable<Double>,
        ref_ubicacion -> Nullable<Text>,
        no_sistema -> Nullable<BigInt>,
        precio_unitario -> Nullable<Double>,
        dibujo -> Nullable<Text>,
        dibujo_filename -> Nullable<Text>,
        dibujo_mimetype -> Nullable<Text>,
        dibujo_last_update -> Nullable<Text>,
        dibujo_charset -> Nullable<Text>,
        precio_m2 -> Nullable<Double>,
        precio_pactado -> Nullable<Double>,
        forma_irregular -> Nullable<Text>,
        fec_crea -> Nullable<Text>,
        usr_crea -> Nullable<Text>,
        fec_modif -> Nullable<Text>,
        usr_modif -> Nullable<Text>,
        pagina_croquis -> Nullable<BigInt>,
    }
}

diesel::table! {
    vidrios_produccion (id) {
        id -> Text,
        no_orden_produccion -> Nullable<BigInt>,
        no_cotizacion -> Nullable<BigInt>,
        dec_seq -> Nullable<BigInt>,
        vip_seq -> Nullable<BigInt>,
        vip_seq_ens -> Nullable<BigInt>,
        no_insumo -> Nullable<BigInt>,
        clase -> Nullable<Text>,
        status -> Nullable<Text>,
        no_etapa -> Nullable<BigInt>,
        hora_cambio_etapa -> Nullable<Text>,
        no_motivo_reproceso -> Nullable<BigInt>,
        vip_seq_rep -> Nullable<BigInt>,
        cve_ubicacion -> Nullable<Text>,
        fec_crea -> Nullable<Text>,
        usr_crea -> Nullable<Text>,
        fec_modif -> Nullable<Text>,
        usr_modif -> Nullable<Text>,
        base -> Nullable<Double>,
        altura -> Nullable<Double>,
        id_skyplanner -> Nullable<Text>,
        seq_clase -> Nullable<BigInt>,
        foldoc_cxc -> Nullable<Text>,
    }
}

diesel::table! {
    log_vidrios_produccion (id) {
        id -> Text,
        no_orden_produccion -> Nullable<BigInt>,
        no_cotizacion -> Nullable<BigInt>,
        dec_seq -> Nullable<BigInt>,
        vip_seq -> Nullable<BigInt>,
        campo -> Nullable<Text>,
        valor_anterior -> Nullable<Text>,
        valor_nuevo -> Nullable<Text>,
        usr_modif -> Nullable<Text>,
        fec_modif -> Nullable<Text>,
        fec_modif_pre -> Nullable<Text>,
    }
}

diesel::table! {
    cambios_etapa (id) {
        id -> Text,
        no_orden_produccion -> Nullable<BigInt>,
        no_cotizacion -> Nullable<BigInt>,
        dec_seq -> Nullable<BigInt>,
        vip_seq -> Nullable<BigInt>,
        no_etapa -> Nullable<BigInt>,
        no_insumo -> Nullable<BigInt>,
        no_insumo_final -> Nullable<BigInt>,
        usr_modif -> Nullable<Text>,
        fec_modif -> Nullable<Text>,
        status -> Nullable<Text>,
        no_etapa_actual -> Nullable<BigInt>,
        no_optimizacion -> Nullable<BigInt>,
        espesor -> Nullable<Double>,
        base -> Nullable<Double>,
        altura -> Nullable<Double>,
        m2 -> Nullable<Double>,
        taladros_cot -> Nullable<BigInt>,
        canto_pulido -> Nullable<Text>,
        filo_muerto -> Nullable<Text>,
    }
}
